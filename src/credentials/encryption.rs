use anyhow::{Context, bail};
use openssl::{
    base64,
    symm::{Cipher, Crypter, Mode},
};

/// Size of the AES-256 key in bytes.
const KEY_SIZE: usize = 32;
/// Size of the random initialization vector in bytes.
const IV_SIZE: usize = 16;
/// AES-256-GCM authentication tag size in bytes.
const TAG_SIZE: usize = 16;

/// Handles encryption/decryption of connection secrets using AES-256-GCM. Encrypted payloads are
/// serialized as `base64(iv || tag || ciphertext)`.
#[derive(Clone)]
pub struct CredentialsEncryption {
    key: [u8; KEY_SIZE],
}

impl CredentialsEncryption {
    /// Creates a new instance from a hex-encoded 32-byte key.
    pub fn new(hex_key: &str) -> anyhow::Result<Self> {
        let key = hex::decode(hex_key.trim())
            .with_context(|| "Credentials encryption key is not valid hex.")?;
        let key_length = key.len();
        let Ok(key) = <[u8; KEY_SIZE]>::try_from(key) else {
            bail!(
                "Credentials encryption key must be {KEY_SIZE} bytes (256 bits), got {key_length} bytes."
            );
        };
        Ok(Self { key })
    }

    /// Encrypts plaintext using AES-256-GCM with a random IV.
    pub fn encrypt(&self, plaintext: &str) -> anyhow::Result<String> {
        let cipher = Cipher::aes_256_gcm();
        let iv = Self::random_iv()?;

        let mut crypter = Crypter::new(cipher, Mode::Encrypt, &self.key, Some(&iv))?;
        let mut ciphertext = vec![0u8; plaintext.len() + cipher.block_size()];
        let mut count = crypter.update(plaintext.as_bytes(), &mut ciphertext)?;
        count += crypter.finalize(&mut ciphertext[count..])?;
        ciphertext.truncate(count);

        let mut tag = [0u8; TAG_SIZE];
        crypter.get_tag(&mut tag)?;

        let mut output = Vec::with_capacity(IV_SIZE + TAG_SIZE + ciphertext.len());
        output.extend_from_slice(&iv);
        output.extend_from_slice(&tag);
        output.extend_from_slice(&ciphertext);

        Ok(base64::encode_block(&output))
    }

    /// Decrypts payload previously produced by [`encrypt`]. Fails if the payload is malformed or
    /// the authentication tag doesn't match.
    pub fn decrypt(&self, payload: &str) -> anyhow::Result<String> {
        let data = base64::decode_block(payload.trim())
            .with_context(|| "Encrypted payload is not valid base64.")?;
        if data.len() < IV_SIZE + TAG_SIZE {
            bail!("Encrypted payload is too short to contain IV and tag.");
        }

        let cipher = Cipher::aes_256_gcm();
        let (iv, rest) = data.split_at(IV_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);

        let mut crypter = Crypter::new(cipher, Mode::Decrypt, &self.key, Some(iv))?;
        crypter.set_tag(tag)?;

        let mut plaintext = vec![0u8; ciphertext.len() + cipher.block_size()];
        let mut count = crypter.update(ciphertext, &mut plaintext)?;
        count += crypter
            .finalize(&mut plaintext[count..])
            .with_context(|| "Encrypted payload failed authentication.")?;
        plaintext.truncate(count);

        String::from_utf8(plaintext).with_context(|| "Decrypted payload is not valid UTF-8.")
    }

    fn random_iv() -> anyhow::Result<[u8; IV_SIZE]> {
        let mut iv = [0u8; IV_SIZE];
        openssl::rand::rand_bytes(&mut iv).with_context(|| "Failed to generate random IV.")?;
        Ok(iv)
    }
}

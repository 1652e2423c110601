use crate::users::UserId;

/// Outcome of the bearer token verification with the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityVerification {
    /// Token is valid and belongs to the specified user.
    Verified(UserId),
    /// Token is invalid, expired, or the identity service couldn't verify it.
    Rejected,
}

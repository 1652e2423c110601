mod user_id;

pub use self::user_id::UserId;

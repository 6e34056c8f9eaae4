use store::StoreError;
use thiserror::Error;

/// Errors from registration, login, and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email address is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// The bearer token failed verification (expired, garbled, or signed
    /// with a different key).
    #[error("invalid token")]
    InvalidToken,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Token encoding failed.
    #[error("token encoding failed: {0}")]
    TokenEncoding(jsonwebtoken::errors::Error),

    /// A store-level failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken(email) => AuthError::EmailTaken(email),
            other => AuthError::Store(other),
        }
    }
}

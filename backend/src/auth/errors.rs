//! Custom error types specific to authentication failures.
//!
//! Every variant maps onto an [`AppError`] so handlers and the `AuthUser`
//! extractor can bubble them up with `?`.

use adapters::AdapterError;
use thiserror::Error;

use crate::errors::AppError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Email already registered.")]
    EmailTaken,

    #[error("Authentication token is missing.")]
    MissingToken,

    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("Session has expired or been revoked.")]
    SessionRevoked,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Storage(#[from] AdapterError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::SessionRevoked => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::InvalidToken => AppError::Forbidden(err.to_string()),
            AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::Storage(err) => err.into(),
            other => AppError::Internal(Box::new(other)),
        }
    }
}

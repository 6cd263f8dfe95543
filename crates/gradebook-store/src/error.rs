//! Store error types.

use thiserror::Error;

use crate::auth::Permission;

/// Errors from cache backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cached payload could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the credential store and session checks.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("user already exists: {0}")]
    UserExists(String),

    /// The session's role does not grant the permission.
    #[error("user '{username}' lacks the '{permission}' permission")]
    PermissionDenied {
        username: String,
        permission: Permission,
    },

    /// No account has been created yet.
    #[error("no users defined; create one with `gradebook users add`")]
    NoUsers,

    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store format error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// Returns `true` for failures caused by the supplied credentials.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, AuthError::UnknownUser(_) | AuthError::WrongPassword)
    }
}

//! Error types for the session layer.

use campus_model::UserId;

/// Errors reported by the auth and profile services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Unknown email or wrong password.
    #[error("invalid login credentials")]
    InvalidCredentials,

    /// No profile row exists for the user.
    #[error("profile not found for user {0}")]
    ProfileNotFound(UserId),

    /// The operation needs a signed-in user and there is none.
    #[error("not signed in")]
    NotSignedIn,

    /// The backend could not be reached or answered with an error.
    #[error("backend error: {0}")]
    Backend(String),
}

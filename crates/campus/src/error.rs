//! Unified error type for Campus.

use campus_gate::GateError;
use campus_model::{ModelError, Role};
use campus_nav::NavError;
use campus_session::SessionError;
use serde::Serialize;

/// Top-level error that wraps all crate-specific errors, plus the ways a
/// login attempt can be refused.
///
/// The `#[from]` variants let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    /// A model-level error (bad route, profile codec).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The navigator was torn down.
    #[error(transparent)]
    Nav(#[from] NavError),

    /// An auth or profile backend error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The gate actor is gone.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Email or password left blank.
    #[error("email and password are required")]
    MissingFields,

    /// The email is not shaped like `local@domain.tld`.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The account exists but was registered with a different role.
    #[error("account is registered as {registered:?}, not {selected}")]
    RoleMismatch {
        selected: Role,
        registered: Option<Role>,
    },

    /// The profile could not be read after a successful sign-in.
    #[error("profile unavailable: {0}")]
    ProfileUnavailable(String),
}

/// A blocking message with a single acknowledgement button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn new(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
        }
    }
}

impl CampusError {
    /// The alert a login screen shows for this error.
    pub fn alert(&self) -> Alert {
        match self {
            CampusError::MissingFields => {
                Alert::new("Error", "Please fill in all fields")
            }
            CampusError::InvalidEmail(_) => {
                Alert::new("Error", "Please enter a valid email address")
            }
            CampusError::RoleMismatch { registered, .. } => {
                let registered = registered
                    .map(|role| role.label())
                    .unwrap_or("an unsupported account type");
                Alert::new(
                    "Wrong account type",
                    format!(
                        "This account is registered as \"{registered}\". \
                         Please choose the matching account type."
                    ),
                )
            }
            CampusError::Session(SessionError::InvalidCredentials) => {
                Alert::new("Login failed", "Invalid email or password")
            }
            other => Alert::new("Login failed", other.to_string()),
        }
    }
}

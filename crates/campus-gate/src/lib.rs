//! The session/role gate for Campus.
//!
//! The gate watches two things, the auth service's session and the
//! navigator's location, and keeps them consistent: a signed-out user
//! ends up on the login screen, a signed-in user ends up inside their
//! role's route group. Redirects always *replace* the current history
//! entry, so "back" cannot return to a screen the user was removed from.
//!
//! # Key types
//!
//! - [`Gate`]: starts and owns the actor task
//! - [`GateHandle`]: read the [`GateView`] and wait for changes
//! - [`reconcile`]: the pure redirect decision
//! - [`GateConfig`]: channel size and token-refresh behavior

mod config;
mod error;
mod gate;
mod logic;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{Gate, GateHandle, GateView};
pub use logic::{reconcile, Decision};

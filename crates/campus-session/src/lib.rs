//! Authentication sessions for Campus.
//!
//! Campus does not implement authentication or storage itself; a hosted
//! backend does. This crate describes what the rest of the app needs from
//! that backend and nothing more:
//!
//! 1. **Authentication**: sign in, sign out, read the current session,
//!    and subscribe to auth-state changes ([`AuthService`] trait)
//! 2. **Profile lookups**: the role stored for a user id
//!    ([`ProfileStore`] trait)
//! 3. **An in-memory backend** ([`MemoryBackend`]) implementing both, for
//!    development and tests
//!
//! # How it fits in the stack
//!
//! ```text
//! Gate Layer (above)  ← observes sessions, resolves roles
//!     ↕
//! Session Layer (this crate)  ← talks to the hosted auth/data service
//!     ↕
//! Model Layer (below)  ← provides UserId, Role, ProfileRow
//! ```

mod auth;
mod error;
mod memory;
mod session;

pub use auth::{AuthService, ProfileStore};
pub use error::SessionError;
pub use memory::MemoryBackend;
pub use session::{AuthEvent, AuthSubscription, BackendConfig, Session};

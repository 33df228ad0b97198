//! Shared vocabulary for Campus.
//!
//! This crate defines the types every other layer speaks in:
//!
//! - **Identity** ([`UserId`]): who the auth service says the user is.
//! - **Roles** ([`Role`]): the closed set of account categories that
//!   decide which part of the app a user may reach.
//! - **Routes** ([`Route`], [`RouteGroup`]): navigation locations and the
//!   top-level partition they belong to.
//! - **Profile rows** ([`ProfileRow`]) and their JSON codec, i.e. what the
//!   data service returns when the role is looked up.
//!
//! # Architecture
//!
//! ```text
//! Gate (above)  ← compares Role::group() with Route::group()
//!     ↕
//! Session / Navigation  ← produce UserId / Route values
//!     ↕
//! Model (this crate)  ← plain data, no I/O
//! ```

mod codec;
mod error;
mod types;

#[cfg(feature = "json")]
pub use codec::{decode_profile, encode_profile};
pub use error::ModelError;
pub use types::{ProfileRow, Role, Route, RouteGroup, UserId};

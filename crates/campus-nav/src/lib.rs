//! Navigation abstraction layer for Campus.
//!
//! Provides the [`Navigator`] trait, which is everything the gate needs
//! from a navigation system: where the user is now, a way to be told when
//! that changes, and a history-preserving `replace`.
//!
//! [`History`] is an in-memory stack implementation, used by the demo and
//! the tests, and as a reference for what `replace` must mean: the top
//! entry is swapped out, so "back" can never land on the replaced screen.

mod error;
mod history;

pub use error::NavError;
pub use history::History;

use std::future::Future;

use campus_model::Route;
use tokio::sync::watch;

/// A navigation system the gate can observe and steer.
pub trait Navigator: Send + Sync + 'static {
    /// The route currently on screen.
    fn current(&self) -> Route;

    /// Replaces the current route without pushing a history entry.
    ///
    /// # Errors
    /// Returns [`NavError::Closed`] if the navigator has been torn down.
    fn replace(
        &self,
        route: Route,
    ) -> impl Future<Output = Result<(), NavError>> + Send;

    /// Subscribes to location changes.
    ///
    /// The receiver starts out holding the current route (marked as seen);
    /// `changed()` resolves on every subsequent move.
    fn watch(&self) -> watch::Receiver<Route>;
}

//! Hooks into the hosted auth and data service.
//!
//! Both traits return `impl Future + Send` rather than using plain
//! `async fn`, because the gate calls them from spawned Tokio tasks and
//! needs the futures to be `Send` for any implementation.

use std::future::Future;

use campus_model::{Role, UserId};

use crate::{AuthSubscription, Session, SessionError};

/// The authentication half of the backend.
///
/// # Example
///
/// ```rust
/// use campus_session::{AuthService, AuthSubscription, Session, SessionError};
///
/// /// A backend where nobody can sign in.
/// struct ClosedDoor;
///
/// impl AuthService for ClosedDoor {
///     async fn sign_in_with_password(
///         &self,
///         _email: &str,
///         _password: &str,
///     ) -> Result<Session, SessionError> {
///         Err(SessionError::InvalidCredentials)
///     }
///
///     async fn sign_out(&self) -> Result<(), SessionError> {
///         Ok(())
///     }
///
///     async fn get_session(&self) -> Result<Option<Session>, SessionError> {
///         Ok(None)
///     }
///
///     async fn on_auth_state_change(&self) -> AuthSubscription {
///         let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();
///         AuthSubscription::new(rx)
///     }
/// }
/// ```
pub trait AuthService: Send + Sync + 'static {
    /// Signs in with email and password and returns the new session.
    ///
    /// Subscribers are notified with [`AuthEvent::SignedIn`](crate::AuthEvent::SignedIn).
    ///
    /// # Errors
    /// - `SessionError::InvalidCredentials`: unknown email or bad password
    /// - `SessionError::Backend`: the service is unreachable
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, SessionError>> + Send;

    /// Ends the current session, if any.
    fn sign_out(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// A point-in-time read of the current session.
    fn get_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, SessionError>> + Send;

    /// Subscribes to sign-in, sign-out, and token-refresh notifications.
    ///
    /// The subscription is released when the returned value is dropped.
    fn on_auth_state_change(
        &self,
    ) -> impl Future<Output = AuthSubscription> + Send;
}

/// The profile table of the backend.
pub trait ProfileStore: Send + Sync + 'static {
    /// Looks up the routable role stored for `user_id`.
    ///
    /// # Returns
    /// - `Ok(Some(role))`: the profile names a routable role
    /// - `Ok(None)`: the profile exists but its role is empty or unknown
    /// - `Err(SessionError::ProfileNotFound)`: there is no profile row
    /// - `Err(SessionError::Backend)`: the lookup itself failed
    fn fetch_profile_role(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<Role>, SessionError>> + Send;
}

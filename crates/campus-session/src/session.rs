//! Session types: what the auth service hands out and how it reports changes.
//!
//! A "session" is the backend's proof that a user signed in. Its lifecycle
//! (expiry, refresh) belongs to the backend; the rest of Campus only cares
//! whether one exists and whose it is.

use std::time::{Duration, Instant};

use campus_model::UserId;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// Configuration for the in-memory backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// How long (in seconds) an access token stays valid before it has
    /// to be refreshed.
    ///
    /// Default: 3600 seconds, the hosted service's default.
    pub token_ttl_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 3600,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authenticated session issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The subject the session was issued for.
    pub user_id: UserId,

    /// Bearer token for data requests.
    pub access_token: String,

    /// Token used to obtain the next access token.
    pub refresh_token: String,

    /// When `access_token` stops being accepted.
    pub expires_at: Instant,
}

impl Session {
    /// Creates a session valid for `ttl` from now.
    pub fn new(
        user_id: UserId,
        access_token: String,
        refresh_token: String,
        ttl: Duration,
    ) -> Self {
        Self {
            user_id,
            access_token,
            refresh_token,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Returns `true` once the access token has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

// ---------------------------------------------------------------------------
// AuthEvent
// ---------------------------------------------------------------------------

/// A notification from the auth service's state-change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The startup observation: whatever session existed when the
    /// observer began. Observers build it from `get_session()`; the
    /// event stream itself never carries it.
    InitialSession(Option<Session>),

    /// A user signed in.
    SignedIn(Session),

    /// The current user signed out (or the session was revoked).
    SignedOut,

    /// The same user's tokens were rotated.
    TokenRefreshed(Session),
}

impl AuthEvent {
    /// The session this event leaves behind, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::InitialSession(session) => session.as_ref(),
            AuthEvent::SignedIn(session)
            | AuthEvent::TokenRefreshed(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }

    /// Consumes the event, returning the session it leaves behind.
    pub fn into_session(self) -> Option<Session> {
        match self {
            AuthEvent::InitialSession(session) => session,
            AuthEvent::SignedIn(session)
            | AuthEvent::TokenRefreshed(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthEvent::InitialSession(_) => "initial_session",
            AuthEvent::SignedIn(_) => "signed_in",
            AuthEvent::SignedOut => "signed_out",
            AuthEvent::TokenRefreshed(_) => "token_refreshed",
        }
    }
}

// ---------------------------------------------------------------------------
// AuthSubscription
// ---------------------------------------------------------------------------

/// A live subscription to auth-state changes.
///
/// The subscription owns the receiving half of the event channel. Dropping
/// it (or calling [`unsubscribe`](Self::unsubscribe)) closes the channel,
/// and the publisher forgets closed subscribers on its next publish, so a
/// torn-down owner is never called back.
#[derive(Debug)]
pub struct AuthSubscription {
    events: mpsc::UnboundedReceiver<AuthEvent>,
}

impl AuthSubscription {
    /// Wraps the receiving end of an event channel.
    pub fn new(events: mpsc::UnboundedReceiver<AuthEvent>) -> Self {
        Self { events }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the publisher has gone away.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.events.recv().await
    }

    /// Releases the subscription.
    pub fn unsubscribe(mut self) {
        self.events.close();
        tracing::debug!("auth subscription released");
    }
}

//! In-memory backend: accounts, profiles, and the current session.
//!
//! `MemoryBackend` plays the hosted service's part for the demo and the
//! tests. It keeps one "device" worth of state: a single current session,
//! like the mobile client it stands in for.
//!
//! # Concurrency note
//!
//! All state sits behind one `tokio::sync::Mutex`. Every operation is a
//! short critical section with no `.await` while the lock is held except
//! the lock itself, so contention is not a concern at this scale.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use campus_model::{decode_profile, encode_profile, ProfileRow, Role, UserId};
use rand::Rng;
use tokio::sync::{mpsc, Mutex};

use crate::{
    AuthEvent, AuthService, AuthSubscription, BackendConfig, ProfileStore,
    Session, SessionError,
};

/// A registered account.
#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Debug)]
struct State {
    /// Accounts keyed by lowercase email.
    accounts: HashMap<String, Account>,

    /// The `profiles` table.
    profiles: HashMap<UserId, ProfileRow>,

    /// The session on this "device", if someone is signed in.
    current: Option<Session>,

    /// Open auth-state subscriptions. Closed ones are pruned on publish.
    subscribers: Vec<mpsc::UnboundedSender<AuthEvent>>,

    /// When set, every call fails as if the network were down.
    offline: bool,

    config: BackendConfig,
}

/// An in-memory stand-in for the hosted auth and data service.
///
/// Cheap to clone; clones share state, so one clone can be handed to the
/// gate as its [`AuthService`] and another as its [`ProfileStore`].
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                accounts: HashMap::new(),
                profiles: HashMap::new(),
                current: None,
                subscribers: Vec::new(),
                offline: false,
                config,
            })),
        }
    }

    /// Registers an account and its profile row.
    ///
    /// `user_type` is written to the profile verbatim, so unroutable
    /// values such as `"admin"` can be stored too. Registering an email
    /// twice replaces the password and keeps the user id.
    pub async fn register_account(
        &self,
        email: &str,
        password: &str,
        user_type: Option<&str>,
    ) -> UserId {
        let mut state = self.state.lock().await;
        let key = email.trim().to_lowercase();

        let user_id = match state.accounts.get(&key) {
            Some(existing) => existing.user_id.clone(),
            None => generate_user_id(),
        };

        state.accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        state
            .profiles
            .insert(user_id.clone(), ProfileRow::new(user_id.clone(), user_type));

        tracing::info!(%user_id, "account registered");
        user_id
    }

    /// Overwrites the `user_type` column of an existing profile.
    ///
    /// # Errors
    /// Returns [`SessionError::ProfileNotFound`] if there is no row.
    pub async fn set_user_type(
        &self,
        user_id: &UserId,
        user_type: Option<&str>,
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        let row = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| SessionError::ProfileNotFound(user_id.clone()))?;
        row.user_type = user_type.map(str::to_string);
        Ok(())
    }

    /// Deletes a profile row, leaving the account able to sign in.
    pub async fn remove_profile(&self, user_id: &UserId) -> Option<ProfileRow> {
        self.state.lock().await.profiles.remove(user_id)
    }

    /// Rotates the current session's tokens and notifies subscribers.
    ///
    /// # Errors
    /// - [`SessionError::NotSignedIn`]: nobody is signed in
    /// - [`SessionError::Backend`]: the backend is offline
    pub async fn refresh_session(&self) -> Result<Session, SessionError> {
        let mut state = self.state.lock().await;
        state.check_online()?;

        let user_id = state
            .current
            .as_ref()
            .map(|s| s.user_id.clone())
            .ok_or(SessionError::NotSignedIn)?;
        let session = state.issue_session(user_id);
        state.current = Some(session.clone());

        tracing::debug!(user_id = %session.user_id, "session refreshed");
        state.publish(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// Simulates losing (or regaining) connectivity.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Number of live auth-state subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock().await;
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl State {
    fn check_online(&self) -> Result<(), SessionError> {
        if self.offline {
            Err(SessionError::Backend("network unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn issue_session(&self, user_id: UserId) -> Session {
        Session::new(
            user_id,
            generate_token(),
            generate_token(),
            Duration::from_secs(self.config.token_ttl_secs),
        )
    }

    /// Sends `event` to every open subscriber, forgetting closed ones.
    fn publish(&mut self, event: AuthEvent) {
        let kind = event.kind();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::debug!(
            event = kind,
            subscribers = self.subscribers.len(),
            "auth event published"
        );
    }
}

impl AuthService for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let mut state = self.state.lock().await;
        state.check_online()?;

        let account = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)
            .cloned()
            .ok_or(SessionError::InvalidCredentials)?;

        let session = state.issue_session(account.user_id);
        state.current = Some(session.clone());

        tracing::info!(user_id = %session.user_id, "signed in");
        state.publish(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.check_online()?;

        if let Some(session) = state.current.take() {
            tracing::info!(user_id = %session.user_id, "signed out");
            state.publish(AuthEvent::SignedOut);
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, SessionError> {
        let state = self.state.lock().await;
        state.check_online()?;
        Ok(state.current.clone())
    }

    async fn on_auth_state_change(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().await;
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.push(tx);
        tracing::debug!(
            subscribers = state.subscribers.len(),
            "auth subscription opened"
        );
        AuthSubscription::new(rx)
    }
}

impl ProfileStore for MemoryBackend {
    async fn fetch_profile_role(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Role>, SessionError> {
        let state = self.state.lock().await;
        state.check_online()?;

        let row = state
            .profiles
            .get(user_id)
            .ok_or_else(|| SessionError::ProfileNotFound(user_id.clone()))?;

        // Rows leave the table as the JSON body the data service sends.
        let body = encode_profile(row)
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        let row = decode_profile(&body)
            .map_err(|e| SessionError::Backend(e.to_string()))?;
        Ok(row.role())
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generates a random UUID-shaped user id (8-4-4-4-12 hex groups).
fn generate_user_id() -> UserId {
    let hex = generate_token();
    UserId(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

// =========================================================================
// Tests
// =========================================================================

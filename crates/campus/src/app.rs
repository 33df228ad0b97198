//! `CampusApp` builder and wiring.
//!
//! This is the entry point for running the portal's session handling. It
//! ties the layers together: auth backend → gate → navigator.

use std::sync::Arc;

use campus_gate::{Gate, GateConfig, GateHandle};
use campus_model::Route;
use campus_nav::{History, Navigator};
use campus_session::{
    AuthService, BackendConfig, MemoryBackend, ProfileStore, Session,
};

use crate::flow::{login, logout, LoginForm};
use crate::CampusError;

/// Builder for configuring and starting a [`CampusApp`].
///
/// # Example
///
/// ```rust,no_run
/// use campus::prelude::*;
///
/// # async fn run() -> Result<(), CampusError> {
/// let app = CampusApp::builder()
///     .gate_config(GateConfig { channel_size: 16, ..GateConfig::default() })
///     .build_in_memory(Route::root())
///     .await;
///
/// app.login(&LoginForm::new("ala@school.edu", "secret", Role::Student))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CampusAppBuilder {
    gate_config: GateConfig,
    backend_config: BackendConfig,
}

impl CampusAppBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gate configuration.
    pub fn gate_config(mut self, config: GateConfig) -> Self {
        self.gate_config = config;
        self
    }

    /// Sets the configuration used by [`build_in_memory`](Self::build_in_memory).
    pub fn backend_config(mut self, config: BackendConfig) -> Self {
        self.backend_config = config;
        self
    }

    /// Starts the gate over the given collaborators.
    pub async fn build<A, P, N>(
        self,
        auth: A,
        profiles: P,
        navigator: N,
    ) -> CampusApp<A, P, N>
    where
        A: AuthService,
        P: ProfileStore,
        N: Navigator,
    {
        let auth = Arc::new(auth);
        let profiles = Arc::new(profiles);
        let navigator = Arc::new(navigator);

        let gate = Gate::start(
            auth.as_ref(),
            Arc::clone(&profiles),
            Arc::clone(&navigator),
            self.gate_config,
        )
        .await;

        CampusApp {
            auth,
            profiles,
            navigator,
            gate,
        }
    }

    /// Starts an app backed by a fresh [`MemoryBackend`] and a [`History`]
    /// opened at `initial`.
    pub async fn build_in_memory(
        self,
        initial: Route,
    ) -> CampusApp<MemoryBackend, MemoryBackend, History> {
        let backend = MemoryBackend::new(self.backend_config.clone());
        self.build(backend.clone(), backend, History::new(initial))
            .await
    }
}

/// A running app: the backend, the navigator, and the gate between them.
pub struct CampusApp<A, P, N> {
    auth: Arc<A>,
    profiles: Arc<P>,
    navigator: Arc<N>,
    gate: Gate,
}

impl CampusApp<MemoryBackend, MemoryBackend, History> {
    /// Creates a new builder.
    pub fn builder() -> CampusAppBuilder {
        CampusAppBuilder::new()
    }
}

impl<A, P, N> CampusApp<A, P, N>
where
    A: AuthService,
    P: ProfileStore,
    N: Navigator,
{
    /// Runs the login flow against this app's backend.
    pub async fn login(&self, form: &LoginForm) -> Result<Session, CampusError> {
        login(self.auth.as_ref(), self.profiles.as_ref(), form).await
    }

    /// Signs the current user out.
    pub async fn logout(&self) -> Result<(), CampusError> {
        logout(self.auth.as_ref()).await
    }

    /// A handle for reading the gate's view.
    pub fn gate(&self) -> GateHandle {
        self.gate.handle()
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Stops the gate and releases its subscription.
    pub async fn shutdown(self) {
        self.gate.shutdown().await;
        tracing::info!("campus app stopped");
    }
}

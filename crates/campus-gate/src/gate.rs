//! Gate actor: a single Tokio task that owns the session/role state.
//!
//! Auth events, location changes and finished role lookups all arrive as
//! commands on one mpsc channel and are handled one at a time, so the
//! state needs no locking. Role lookups run in their own tasks; each is
//! tagged with a generation number and the actor ignores any result
//! whose generation is no longer current.

use std::sync::Arc;

use campus_model::{Role, Route, UserId};
use campus_nav::Navigator;
use campus_session::{
    AuthEvent, AuthService, AuthSubscription, ProfileStore, Session,
    SessionError,
};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{reconcile, Decision, GateConfig, GateError};

// ---------------------------------------------------------------------------
// GateView
// ---------------------------------------------------------------------------

/// What screens may read about the gate's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateView {
    /// Whether the auth service currently reports a session.
    pub session_present: bool,

    /// The signed-in user, if any.
    pub user_id: Option<UserId>,

    /// The resolved role. `None` while unknown or unroutable.
    pub role: Option<Role>,

    /// True until the role for the current user has been resolved.
    /// Screens show a spinner while this is set.
    pub loading: bool,

    /// Where the gate believes the user is.
    pub location: Route,
}

impl GateView {
    fn starting(location: Route) -> Self {
        Self {
            session_present: false,
            user_id: None,
            role: None,
            loading: true,
            location,
        }
    }

    /// Returns `true` when the gate has nothing left to do: the role is
    /// resolved and the location already satisfies it.
    pub fn is_settled(&self) -> bool {
        !self.loading
            && reconcile(
                self.session_present,
                self.role,
                self.location.group(),
                self.loading,
            ) == Decision::Stay
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Everything the actor reacts to.
enum GateCommand {
    /// An auth-state change (including the startup observation).
    Auth(AuthEvent),

    /// A role lookup finished.
    RoleResolved {
        generation: u64,
        user_id: UserId,
        outcome: Result<Option<Role>, SessionError>,
    },

    /// The navigator's location moved; the actor re-reads it.
    LocationChanged,

    Shutdown,
}

// ---------------------------------------------------------------------------
// GateHandle
// ---------------------------------------------------------------------------

/// Handle to a running gate. Cheap to clone.
#[derive(Clone)]
pub struct GateHandle {
    sender: mpsc::Sender<GateCommand>,
    view: watch::Receiver<GateView>,
}

impl GateHandle {
    /// The latest published view.
    pub fn view(&self) -> GateView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified on every view change.
    pub fn watch(&self) -> watch::Receiver<GateView> {
        self.view.clone()
    }

    /// Waits until the view satisfies `predicate` and returns it.
    ///
    /// Resolves immediately if the current view already matches.
    ///
    /// # Errors
    /// Returns [`GateError::Unavailable`] if the gate stops first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&GateView) -> bool,
    ) -> Result<GateView, GateError> {
        let mut view = self.view.clone();
        let matched = view
            .wait_for(|v| predicate(v))
            .await
            .map_err(|_| GateError::Unavailable)?;
        Ok(matched.clone())
    }

    /// Waits until the role is known and no redirect is pending.
    pub async fn settled(&self) -> Result<GateView, GateError> {
        self.wait_for(GateView::is_settled).await
    }

    /// Asks the gate to re-read the navigator's location and reconcile.
    ///
    /// Location changes are picked up automatically; this is for
    /// navigators whose watch channel may lag behind.
    pub async fn sync_location(&self) -> Result<(), GateError> {
        self.sender
            .send(GateCommand::LocationChanged)
            .await
            .map_err(|_| GateError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// GateActor
// ---------------------------------------------------------------------------

struct GateActor<P, N> {
    config: GateConfig,
    profiles: Arc<P>,
    navigator: Arc<N>,
    session: Option<Session>,
    role: Option<Role>,
    loading: bool,
    location: Route,
    /// Bumped for every role lookup and on sign-out.
    generation: u64,
    receiver: mpsc::Receiver<GateCommand>,
    /// Weak so that the actor alone does not keep its channel open.
    commands: mpsc::WeakSender<GateCommand>,
    view: watch::Sender<GateView>,
}

impl<P: ProfileStore, N: Navigator> GateActor<P, N> {
    async fn run(mut self, initial: Option<Session>) {
        tracing::info!(location = %self.location, "gate started");

        self.handle_auth(AuthEvent::InitialSession(initial));
        self.reconcile().await;

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GateCommand::Auth(event) => self.handle_auth(event),
                GateCommand::RoleResolved {
                    generation,
                    user_id,
                    outcome,
                } => self.handle_role_resolved(generation, user_id, outcome),
                GateCommand::LocationChanged => {
                    self.location = self.navigator.current();
                }
                GateCommand::Shutdown => {
                    tracing::info!("gate shutting down");
                    break;
                }
            }
            self.reconcile().await;
        }

        tracing::info!("gate stopped");
    }

    fn handle_auth(&mut self, event: AuthEvent) {
        let kind = event.kind();
        let refreshed = matches!(event, AuthEvent::TokenRefreshed(_));
        let previous = self.session.as_ref().map(|s| s.user_id.clone());
        self.session = event.into_session();

        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone())
        else {
            tracing::info!(event = kind, "session observed: none");
            // Invalidates any lookup still in flight.
            self.generation += 1;
            self.role = None;
            self.loading = false;
            return;
        };

        tracing::info!(event = kind, %user_id, "session observed");

        if previous.as_ref() == Some(&user_id) {
            if refreshed && !self.config.refresh_role_on_token_refresh {
                return;
            }
            // Same user: keep the last known role while re-reading it.
            self.resolve_role(user_id);
            return;
        }

        self.role = None;
        self.loading = true;
        self.resolve_role(user_id);
    }

    fn resolve_role(&mut self, user_id: UserId) {
        self.generation += 1;
        let generation = self.generation;

        let Some(commands) = self.commands.upgrade() else {
            return;
        };
        let profiles = Arc::clone(&self.profiles);

        tracing::debug!(%user_id, generation, "resolving role");
        tokio::spawn(async move {
            let outcome = profiles.fetch_profile_role(&user_id).await;
            let _ = commands
                .send(GateCommand::RoleResolved {
                    generation,
                    user_id,
                    outcome,
                })
                .await;
        });
    }

    fn handle_role_resolved(
        &mut self,
        generation: u64,
        user_id: UserId,
        outcome: Result<Option<Role>, SessionError>,
    ) {
        if generation != self.generation {
            tracing::debug!(
                %user_id,
                generation,
                current = self.generation,
                "discarding stale role lookup"
            );
            return;
        }

        match outcome {
            Ok(Some(role)) => {
                tracing::info!(%user_id, %role, "role resolved");
                self.role = Some(role);
            }
            Ok(None) => {
                tracing::warn!(%user_id, "profile has no routable role");
                self.role = None;
            }
            Err(e) => {
                // The session is left alone; only navigation is affected.
                tracing::warn!(%user_id, error = %e, "role lookup failed");
                self.role = None;
            }
        }
        self.loading = false;
    }

    /// Applies the redirect decision, then publishes the view.
    async fn reconcile(&mut self) {
        let decision = reconcile(
            self.session.is_some(),
            self.role,
            self.location.group(),
            self.loading,
        );

        if let Decision::Redirect(route) = decision {
            tracing::info!(from = %self.location, to = %route, "redirecting");
            match self.navigator.replace(route.clone()).await {
                Ok(()) => self.location = route,
                Err(e) => {
                    tracing::warn!(to = %route, error = %e, "redirect failed");
                }
            }
        }

        self.publish();
    }

    fn publish(&self) {
        let next = GateView {
            session_present: self.session.is_some(),
            user_id: self.session.as_ref().map(|s| s.user_id.clone()),
            role: self.role,
            loading: self.loading,
            location: self.location.clone(),
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

// ---------------------------------------------------------------------------
// Forwarders
// ---------------------------------------------------------------------------

async fn forward_auth(
    mut subscription: AuthSubscription,
    commands: mpsc::Sender<GateCommand>,
) {
    while let Some(event) = subscription.recv().await {
        if commands.send(GateCommand::Auth(event)).await.is_err() {
            break;
        }
    }
    subscription.unsubscribe();
}

async fn forward_location(
    mut locations: watch::Receiver<Route>,
    commands: mpsc::Sender<GateCommand>,
) {
    while locations.changed().await.is_ok() {
        if commands.send(GateCommand::LocationChanged).await.is_err() {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// A running gate: the actor task plus the tasks feeding it.
///
/// Dropping a `Gate` aborts all of them, which releases the auth
/// subscription. Prefer [`shutdown`](Self::shutdown) to wait for that.
pub struct Gate {
    handle: GateHandle,
    actor: Option<JoinHandle<()>>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Gate {
    /// Starts a gate observing `auth` and steering `navigator`.
    ///
    /// Subscribes to auth changes before reading the current session, so
    /// a change that lands in between is still delivered afterwards.
    pub async fn start<A, P, N>(
        auth: &A,
        profiles: Arc<P>,
        navigator: Arc<N>,
        config: GateConfig,
    ) -> Gate
    where
        A: AuthService,
        P: ProfileStore,
        N: Navigator,
    {
        let config = config.validated();
        let subscription = auth.on_auth_state_change().await;

        let initial = match auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session, assuming none");
                None
            }
        };

        let (tx, rx) = mpsc::channel(config.channel_size);
        // Subscribe before reading, so a move in between is not lost.
        let mut locations = navigator.watch();
        let location = locations.borrow_and_update().clone();
        let (view_tx, view_rx) =
            watch::channel(GateView::starting(location.clone()));

        let actor = GateActor {
            config,
            profiles,
            navigator,
            session: None,
            role: None,
            loading: true,
            location,
            generation: 0,
            receiver: rx,
            commands: tx.downgrade(),
            view: view_tx,
        };

        let actor = tokio::spawn(actor.run(initial));
        let forwarders = vec![
            tokio::spawn(forward_auth(subscription, tx.clone())),
            tokio::spawn(forward_location(locations, tx.clone())),
        ];

        Gate {
            handle: GateHandle {
                sender: tx,
                view: view_rx,
            },
            actor: Some(actor),
            forwarders,
        }
    }

    /// Returns a handle for reading the view.
    pub fn handle(&self) -> GateHandle {
        self.handle.clone()
    }

    /// Stops the actor and waits for every task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.handle.sender.send(GateCommand::Shutdown).await;
        if let Some(actor) = self.actor.take() {
            let _ = actor.await;
        }
        for forwarder in std::mem::take(&mut self.forwarders) {
            forwarder.abort();
            let _ = forwarder.await;
        }
        tracing::debug!("gate tasks released");
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        if let Some(actor) = &self.actor {
            actor.abort();
        }
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}

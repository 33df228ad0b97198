//! Integration tests for the gate using the in-memory backend and history.
//!
//! Tests run on a paused clock: `settle()` only returns once every other
//! task is idle, which lets a test assert that something did *not* happen.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use campus_gate::{Gate, GateConfig, GateError, GateHandle};
use campus_model::{Role, Route, RouteGroup, UserId};
use campus_nav::{History, Navigator};
use campus_session::{
    AuthService, MemoryBackend, ProfileStore, SessionError,
};
use tokio::sync::Notify;

// =========================================================================
// Mock profile store: lookups for a user block until released.
// =========================================================================

#[derive(Default)]
struct GatedProfiles {
    roles: HashMap<UserId, Role>,
    gates: HashMap<UserId, Arc<Notify>>,
}

impl GatedProfiles {
    fn with_role(mut self, user_id: &UserId, role: Role) -> Self {
        self.roles.insert(user_id.clone(), role);
        self
    }

    /// Makes lookups for `user_id` wait; returns the release switch.
    fn gated(&mut self, user_id: &UserId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(user_id.clone(), Arc::clone(&gate));
        gate
    }
}

impl ProfileStore for GatedProfiles {
    async fn fetch_profile_role(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Role>, SessionError> {
        if let Some(gate) = self.gates.get(user_id) {
            gate.notified().await;
        }
        match self.roles.get(user_id) {
            Some(role) => Ok(Some(*role)),
            None => Err(SessionError::ProfileNotFound(user_id.clone())),
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn route(path: &str) -> Route {
    Route::parse(path).unwrap()
}

async fn start(
    backend: &MemoryBackend,
    history: &History,
    config: GateConfig,
) -> (Gate, GateHandle) {
    let gate = Gate::start(
        backend,
        Arc::new(backend.clone()),
        Arc::new(history.clone()),
        config,
    )
    .await;
    let handle = gate.handle();
    (gate, handle)
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_startup_without_session_redirects_to_login() {
    let backend = MemoryBackend::default();
    let history = History::new(route("/(student)/grades"));
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;

    let view = handle.settled().await.unwrap();
    assert!(!view.session_present);
    assert!(!view.loading);
    assert_eq!(view.location, Route::login());
    assert_eq!(history.entries().await, vec![Route::login()]);

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_with_existing_session_goes_home() {
    let backend = MemoryBackend::default();
    let user = backend
        .register_account("t@school.edu", "pw", Some("teacher"))
        .await;
    backend.sign_in_with_password("t@school.edu", "pw").await.unwrap();

    let history = History::new(Route::root());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;

    let view = handle.settled().await.unwrap();
    assert_eq!(view.user_id, Some(user));
    assert_eq!(view.role, Some(Role::Teacher));
    assert_eq!(history.current(), Role::Teacher.home_route());

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_with_backend_offline_treated_as_signed_out() {
    let backend = MemoryBackend::default();
    backend.set_offline(true).await;

    let history = History::new(route("/(parent)"));
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;

    let view = handle.settled().await.unwrap();
    assert!(!view.session_present);
    assert_eq!(view.location.group(), RouteGroup::Auth);

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_with_session_but_no_profile_goes_to_login() {
    let backend = MemoryBackend::default();
    let user = backend
        .register_account("t@school.edu", "pw", Some("teacher"))
        .await;
    backend.remove_profile(&user).await;
    backend.sign_in_with_password("t@school.edu", "pw").await.unwrap();

    let history = History::new(route("/(teacher)/grades"));
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;

    let view = handle.settled().await.unwrap();
    assert!(view.session_present);
    assert_eq!(view.user_id, Some(user));
    assert_eq!(view.role, None);
    assert_eq!(view.location, Route::login());
    assert_eq!(history.entries().await, vec![Route::login()]);
    assert!(backend.get_session().await.unwrap().is_some());

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_move_right_after_start_is_reconciled() {
    let backend = MemoryBackend::default();
    let history = History::new(Route::login());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;

    // No yield between start and the push.
    history.push(route("/(teacher)/grades")).await.unwrap();

    let view = handle
        .wait_for(|v| v.is_settled())
        .await
        .unwrap();
    settle().await;

    assert_eq!(view.location.group(), RouteGroup::Auth);
    assert_eq!(history.current(), Route::login());
    assert!(!history.entries().await.contains(&route("/(teacher)/grades")));

    gate.shutdown().await;
}

// =========================================================================
// Loading
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_no_redirect_while_role_is_loading() {
    let backend = MemoryBackend::default();
    let user = backend
        .register_account("t@school.edu", "pw", Some("teacher"))
        .await;
    backend.sign_in_with_password("t@school.edu", "pw").await.unwrap();

    let mut profiles = GatedProfiles::default().with_role(&user, Role::Teacher);
    let release = profiles.gated(&user);

    let history = History::new(route("/(student)"));
    let gate = Gate::start(
        &backend,
        Arc::new(profiles),
        Arc::new(history.clone()),
        GateConfig::default(),
    )
    .await;
    let handle = gate.handle();

    settle().await;
    let view = handle.view();
    assert!(view.loading);
    assert!(view.session_present);
    assert_eq!(history.current(), route("/(student)"));

    release.notify_one();
    let view = handle.settled().await.unwrap();
    assert!(!view.loading);
    assert_eq!(history.current(), Role::Teacher.home_route());

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_clears_loading_and_keeps_session() {
    let backend = MemoryBackend::default();
    let user = backend
        .register_account("p@home.org", "pw", Some("parent"))
        .await;
    backend.remove_profile(&user).await;

    let history = History::new(Route::login());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;

    backend.sign_in_with_password("p@home.org", "pw").await.unwrap();
    let view = handle
        .wait_for(|v| v.session_present && !v.loading)
        .await
        .unwrap();

    assert_eq!(view.role, None);
    assert_eq!(view.location, Route::login());
    assert!(backend.get_session().await.unwrap().is_some());

    gate.shutdown().await;
}

// =========================================================================
// Staleness
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stale_role_lookup_is_discarded() {
    let backend = MemoryBackend::default();
    let a = backend.register_account("a@school.edu", "pw", None).await;
    let b = backend.register_account("b@school.edu", "pw", None).await;

    let mut profiles = GatedProfiles::default()
        .with_role(&a, Role::Teacher)
        .with_role(&b, Role::Student);
    let release_a = profiles.gated(&a);

    let history = History::new(Route::login());
    let gate = Gate::start(
        &backend,
        Arc::new(profiles),
        Arc::new(history.clone()),
        GateConfig::default(),
    )
    .await;
    let handle = gate.handle();

    // A's lookup hangs; B signs in and resolves first.
    backend.sign_in_with_password("a@school.edu", "pw").await.unwrap();
    settle().await;
    backend.sign_in_with_password("b@school.edu", "pw").await.unwrap();

    let view = handle
        .wait_for(|v| v.user_id.as_ref() == Some(&b) && !v.loading)
        .await
        .unwrap();
    assert_eq!(view.role, Some(Role::Student));

    // A's late answer must not overwrite B's role.
    release_a.notify_one();
    settle().await;

    let view = handle.view();
    assert_eq!(view.user_id, Some(b));
    assert_eq!(view.role, Some(Role::Student));
    assert_eq!(history.current(), Role::Student.home_route());

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_lookup_finishing_after_sign_out_is_discarded() {
    let backend = MemoryBackend::default();
    let a = backend.register_account("a@school.edu", "pw", None).await;

    let mut profiles = GatedProfiles::default().with_role(&a, Role::Teacher);
    let release = profiles.gated(&a);

    let history = History::new(Route::login());
    let gate = Gate::start(
        &backend,
        Arc::new(profiles),
        Arc::new(history.clone()),
        GateConfig::default(),
    )
    .await;
    let handle = gate.handle();

    backend.sign_in_with_password("a@school.edu", "pw").await.unwrap();
    settle().await;
    backend.sign_out().await.unwrap();
    settle().await;

    release.notify_one();
    settle().await;

    let view = handle.view();
    assert!(!view.session_present);
    assert_eq!(view.role, None);
    assert!(!view.loading);
    assert_eq!(history.current(), Route::login());

    gate.shutdown().await;
}

// =========================================================================
// Navigation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_sign_out_replaces_protected_screen() {
    let backend = MemoryBackend::default();
    backend
        .register_account("t@school.edu", "pw", Some("teacher"))
        .await;
    backend.sign_in_with_password("t@school.edu", "pw").await.unwrap();

    let history = History::new(Route::root());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    handle.settled().await.unwrap();

    history.push(route("/(teacher)/grades")).await.unwrap();
    settle().await;
    assert_eq!(handle.view().location, route("/(teacher)/grades"));

    backend.sign_out().await.unwrap();
    let view = handle
        .wait_for(|v| !v.session_present && v.is_settled())
        .await
        .unwrap();
    assert_eq!(view.location, Route::login());

    // The grades entry was replaced, not buried.
    assert!(!history.entries().await.contains(&route("/(teacher)/grades")));
    assert_eq!(history.back().await, Some(Role::Teacher.home_route()));

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_navigating_into_other_role_group_redirects_home() {
    let backend = MemoryBackend::default();
    backend
        .register_account("s@school.edu", "pw", Some("student"))
        .await;
    backend.sign_in_with_password("s@school.edu", "pw").await.unwrap();

    let history = History::new(Route::login());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    handle.settled().await.unwrap();
    assert_eq!(history.current(), Role::Student.home_route());

    history.push(route("/(teacher)/lessons")).await.unwrap();
    settle().await;

    assert_eq!(history.current(), Role::Student.home_route());
    assert_eq!(handle.view().location, Role::Student.home_route());

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unroutable_role_is_sent_to_login_without_sign_out() {
    let backend = MemoryBackend::default();
    backend
        .register_account("root@school.edu", "pw", Some("admin"))
        .await;

    let history = History::new(route("/(parent)"));
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    handle.settled().await.unwrap();

    backend.sign_in_with_password("root@school.edu", "pw").await.unwrap();
    let view = handle
        .wait_for(|v| v.session_present && v.is_settled())
        .await
        .unwrap();

    assert_eq!(view.role, None);
    assert_eq!(view.location, Route::login());

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_sync_location_picks_up_current_route() {
    let backend = MemoryBackend::default();
    let history = History::new(Route::login());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    handle.settled().await.unwrap();

    history.push(Route::register()).await.unwrap();
    handle.sync_location().await.unwrap();
    let view = handle
        .wait_for(|v| v.location == Route::register())
        .await
        .unwrap();
    assert!(view.is_settled());

    gate.shutdown().await;
}

// =========================================================================
// Token refresh
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_token_refresh_rereads_role_without_loading() {
    let backend = MemoryBackend::default();
    let user = backend
        .register_account("x@school.edu", "pw", Some("student"))
        .await;
    backend.sign_in_with_password("x@school.edu", "pw").await.unwrap();

    let history = History::new(Route::root());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    handle.settled().await.unwrap();

    let mut views = handle.watch();
    let _ = views.borrow_and_update();

    backend.set_user_type(&user, Some("parent")).await.unwrap();
    backend.refresh_session().await.unwrap();

    let view = handle
        .wait_for(|v| v.role == Some(Role::Parent) && v.is_settled())
        .await
        .unwrap();
    assert_eq!(view.location, Role::Parent.home_route());

    // Every intermediate view kept a role and never showed loading.
    while views.has_changed().unwrap_or(false) {
        let seen = views.borrow_and_update().clone();
        assert!(!seen.loading);
        assert!(seen.role.is_some());
    }

    gate.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_token_refresh_ignored_when_disabled() {
    let backend = MemoryBackend::default();
    let user = backend
        .register_account("x@school.edu", "pw", Some("student"))
        .await;
    backend.sign_in_with_password("x@school.edu", "pw").await.unwrap();

    let history = History::new(Route::root());
    let config = GateConfig {
        refresh_role_on_token_refresh: false,
        ..GateConfig::default()
    };
    let (gate, handle) = start(&backend, &history, config).await;
    handle.settled().await.unwrap();

    backend.set_user_type(&user, Some("parent")).await.unwrap();
    backend.refresh_session().await.unwrap();
    settle().await;

    assert_eq!(handle.view().role, Some(Role::Student));
    assert_eq!(history.current(), Role::Student.home_route());

    gate.shutdown().await;
}

// =========================================================================
// Teardown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_subscription() {
    let backend = MemoryBackend::default();
    let history = History::new(Route::login());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    assert_eq!(backend.subscriber_count().await, 1);

    gate.shutdown().await;

    assert_eq!(backend.subscriber_count().await, 0);
    assert!(matches!(
        handle.sync_location().await,
        Err(GateError::Unavailable)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_subscription() {
    let backend = MemoryBackend::default();
    let history = History::new(Route::login());
    let (gate, handle) = start(&backend, &history, GateConfig::default()).await;
    drop(handle);

    drop(gate);
    settle().await;

    assert_eq!(backend.subscriber_count().await, 0);
}

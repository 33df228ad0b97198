//! # Campus
//!
//! Session and role handling for a school portal.
//!
//! Students, teachers, and parents each get their own group of screens.
//! Campus keeps the screen a user sees consistent with who they are: the
//! gate watches the auth backend and the navigator, and replaces the
//! current screen whenever the two disagree.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campus::prelude::*;
//!
//! # async fn run() -> Result<(), CampusError> {
//! let app = CampusApp::builder().build_in_memory(Route::root()).await;
//! app.auth()
//!     .register_account("ala@school.edu", "secret", Some("student"))
//!     .await;
//!
//! app.login(&LoginForm::new("ala@school.edu", "secret", Role::Student))
//!     .await?;
//! let view = app
//!     .gate()
//!     .wait_for(|v| v.role == Some(Role::Student) && v.is_settled())
//!     .await?;
//! assert_eq!(view.location, Role::Student.home_route());
//! # Ok(())
//! # }
//! ```

mod app;
mod error;
mod flow;
pub mod logging;

pub use app::{CampusApp, CampusAppBuilder};
pub use error::{Alert, CampusError};
pub use flow::{login, logout, LoginForm};

/// Everything needed to wire up and drive an app.
pub mod prelude {
    pub use crate::{
        login, logout, Alert, CampusApp, CampusAppBuilder, CampusError,
        LoginForm,
    };
    pub use campus_gate::{
        reconcile, Decision, Gate, GateConfig, GateError, GateHandle,
        GateView,
    };
    pub use campus_model::{ProfileRow, Role, Route, RouteGroup, UserId};
    pub use campus_nav::{History, NavError, Navigator};
    pub use campus_session::{
        AuthEvent, AuthService, BackendConfig, MemoryBackend, ProfileStore,
        Session, SessionError,
    };
}

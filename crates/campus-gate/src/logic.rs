//! The redirect decision.
//!
//! [`reconcile`] is a pure function of the gate's four inputs. The actor
//! re-runs it after every change; keeping it free of I/O lets the decision
//! table be tested exhaustively.

use campus_model::{Role, Route, RouteGroup};

/// What the gate should do about the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The location is acceptable (or no decision can be made yet).
    Stay,

    /// Replace the current location with this route.
    Redirect(Route),
}

/// Decides whether the user must be moved, and where.
///
/// Rules, first match wins:
///
/// 1. still loading → stay (no flash redirect before the role is known)
/// 2. no session, outside `auth` → login
/// 3. no session → stay
/// 4. no role, outside `auth` → login
/// 5. no role → stay
/// 6. in `auth` → the role's home route
/// 7. in another role's group (or `other`) → the role's home route
/// 8. otherwise → stay
///
/// A user without a resolvable role counts as signed out for navigation.
/// Rules 3 and 5 are what make the function idempotent: once on an auth
/// screen, asking again never produces another redirect.
pub fn reconcile(
    session_present: bool,
    role: Option<Role>,
    location: RouteGroup,
    loading: bool,
) -> Decision {
    if loading {
        return Decision::Stay;
    }

    let in_auth = location == RouteGroup::Auth;

    if !session_present {
        return if in_auth {
            Decision::Stay
        } else {
            Decision::Redirect(Route::login())
        };
    }

    let Some(role) = role else {
        return if in_auth {
            Decision::Stay
        } else {
            Decision::Redirect(Route::login())
        };
    };

    if in_auth || location != role.group() {
        return Decision::Redirect(role.home_route());
    }

    Decision::Stay
}

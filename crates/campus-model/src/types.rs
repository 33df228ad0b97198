//! Core model types: identities, roles, and routes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The subject identifier the auth service assigns to a user.
///
/// The id is opaque to us (the hosted service issues UUIDs), so this is a
/// newtype over `String` rather than a parsed value. Wrapping it keeps a
/// user id from being confused with an email or a token in signatures.
///
/// `#[serde(transparent)]` makes `UserId("abc")` serialize as just `"abc"`,
/// which is how the `id` column of a profile row looks on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The account category stored in a user's profile.
///
/// This is a closed set. Profiles may carry other strings (older
/// registration screens wrote `"admin"`), but those are not routable:
/// [`Role::parse`] maps them to `None`, and the gate treats such a user
/// exactly like one whose profile could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

impl Role {
    /// Every routable role, in display order.
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Parent];

    /// Parses the `user_type` column of a profile row.
    ///
    /// Matching is exact (lowercase), the same as the values the
    /// registration form writes.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "parent" => Some(Role::Parent),
            _ => None,
        }
    }

    /// Returns the column value for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }

    /// The route group this role is allowed to be in.
    pub fn group(&self) -> RouteGroup {
        match self {
            Role::Student => RouteGroup::Student,
            Role::Teacher => RouteGroup::Teacher,
            Role::Parent => RouteGroup::Parent,
        }
    }

    /// The landing route for this role.
    ///
    /// The match is exhaustive on purpose: adding a role without a home
    /// route is a compile error, not a runtime fallthrough.
    pub fn home_route(&self) -> Route {
        match self {
            Role::Student => Route::group_root("student"),
            Role::Teacher => Route::group_root("teacher"),
            Role::Parent => Route::group_root("parent"),
        }
    }

    /// Human-readable account type, as shown in login error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Parent => "Parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RouteGroup
// ---------------------------------------------------------------------------

/// The top-level navigational partition a route belongs to.
///
/// Each role owns exactly one group; `Auth` holds the screens an
/// unauthenticated user may see; everything else (the root index, stray
/// deep links) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteGroup {
    Auth,
    Student,
    Teacher,
    Parent,
    Other,
}

impl RouteGroup {
    /// Classifies a single path segment such as `"(teacher)"`.
    fn from_segment(segment: &str) -> RouteGroup {
        match segment {
            "(auth)" => RouteGroup::Auth,
            "(student)" => RouteGroup::Student,
            "(teacher)" => RouteGroup::Teacher,
            "(parent)" => RouteGroup::Parent,
            _ => RouteGroup::Other,
        }
    }
}

impl fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteGroup::Auth => write!(f, "auth"),
            RouteGroup::Student => write!(f, "student"),
            RouteGroup::Teacher => write!(f, "teacher"),
            RouteGroup::Parent => write!(f, "parent"),
            RouteGroup::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// An absolute navigation location, stored as its path segments.
///
/// Group segments keep their parentheses, so `/(teacher)/grades` is
/// `["(teacher)", "grades"]` and the root `/` has no segments at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route {
    segments: Vec<String>,
}

impl Route {
    /// The application root, `/`.
    pub fn root() -> Route {
        Route {
            segments: Vec::new(),
        }
    }

    /// The login screen, `/(auth)/login`.
    pub fn login() -> Route {
        Route {
            segments: vec!["(auth)".to_string(), "login".to_string()],
        }
    }

    /// The registration screen, `/(auth)/register`.
    pub fn register() -> Route {
        Route {
            segments: vec!["(auth)".to_string(), "register".to_string()],
        }
    }

    fn group_root(name: &str) -> Route {
        Route {
            segments: vec![format!("({name})")],
        }
    }

    /// Parses an absolute path like `/(student)/grades`.
    ///
    /// Repeated and trailing slashes are ignored. A segment that opens a
    /// group must close it and name it: `(teacher` and `()` are rejected.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidRoute`] for relative paths and
    /// malformed group segments.
    pub fn parse(path: &str) -> Result<Route, ModelError> {
        let trimmed = path.trim();
        let rest = trimmed.strip_prefix('/').ok_or_else(|| {
            ModelError::InvalidRoute(format!("{trimmed:?} is not absolute"))
        })?;

        let mut segments = Vec::new();
        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            if segment.starts_with('(') || segment.ends_with(')') {
                let name = segment
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(')'))
                    .ok_or_else(|| {
                        ModelError::InvalidRoute(format!(
                            "unbalanced group segment {segment:?}"
                        ))
                    })?;
                if name.is_empty() || name.contains(['(', ')']) {
                    return Err(ModelError::InvalidRoute(format!(
                        "bad group segment {segment:?}"
                    )));
                }
            }
            segments.push(segment.to_string());
        }

        Ok(Route { segments })
    }

    /// The path segments, group segments included.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Classifies this route by its first segment.
    pub fn group(&self) -> RouteGroup {
        self.segments
            .first()
            .map(|s| RouteGroup::from_segment(s))
            .unwrap_or(RouteGroup::Other)
    }

    /// Returns a child route, e.g. `/(teacher)` → `/(teacher)/grades`.
    pub fn join(&self, segment: &str) -> Route {
        let mut segments = self.segments.clone();
        segments.extend(
            segment
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Route { segments }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Route {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl TryFrom<String> for Route {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Route::parse(&value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.to_string()
    }
}

// ---------------------------------------------------------------------------
// ProfileRow
// ---------------------------------------------------------------------------

/// A row of the `profiles` table, as far as the gate cares about it.
///
/// `user_type` is nullable in the table; a missing or unrecognized value
/// means "no routable role".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// The profile's primary key, equal to the auth user's id.
    pub id: UserId,

    /// The raw role column.
    #[serde(default)]
    pub user_type: Option<String>,
}

impl ProfileRow {
    /// Builds a row with the given raw `user_type`.
    pub fn new(id: UserId, user_type: Option<&str>) -> Self {
        Self {
            id,
            user_type: user_type.map(str::to_string),
        }
    }

    /// The routable role stored in this row, if any.
    pub fn role(&self) -> Option<Role> {
        self.user_type.as_deref().and_then(Role::parse)
    }
}

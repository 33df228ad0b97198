//! The login and logout flows.
//!
//! Login does not navigate. On success it returns the session and the gate
//! moves the user once it observes the sign-in. On failure the user is
//! signed out again (where a session was created) and stays on the login
//! screen.
//!
//! The flow is:
//!   1. Validate the form (non-empty fields, email shape)
//!   2. Sign in with email and password
//!   3. Read the stored role for the new session's user
//!   4. Refuse the login if it differs from the role the user picked

use campus_model::Role;
use campus_session::{AuthService, ProfileStore, Session};
use serde::Deserialize;

use crate::CampusError;

/// What the login screen submits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// The account type the user selected on the screen.
    pub role: Role,
}

impl LoginForm {
    pub fn new(email: &str, password: &str, role: Role) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            role,
        }
    }

    /// Checks the form before anything is sent to the backend.
    ///
    /// # Errors
    /// - [`CampusError::MissingFields`]: email or password is blank
    /// - [`CampusError::InvalidEmail`]: email is not `local@domain.tld`
    pub fn validate(&self) -> Result<(), CampusError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.trim().is_empty() {
            return Err(CampusError::MissingFields);
        }
        if !is_email(email) {
            return Err(CampusError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot in the
/// domain with something on both sides of it.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Signs in and checks the stored role against the selected one.
///
/// # Errors
/// - form errors from [`LoginForm::validate`]
/// - [`CampusError::Session`]: the sign-in itself failed
/// - [`CampusError::ProfileUnavailable`]: the profile could not be read
/// - [`CampusError::RoleMismatch`]: the account has a different role
pub async fn login<A, P>(
    auth: &A,
    profiles: &P,
    form: &LoginForm,
) -> Result<Session, CampusError>
where
    A: AuthService,
    P: ProfileStore,
{
    form.validate()?;

    let session = auth
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "sign-in refused"))?;
    let user_id = session.user_id.clone();

    let registered = match profiles.fetch_profile_role(&user_id).await {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "profile lookup failed after sign-in");
            sign_out_quietly(auth).await;
            return Err(CampusError::ProfileUnavailable(e.to_string()));
        }
    };

    if registered != Some(form.role) {
        tracing::info!(
            %user_id,
            selected = %form.role,
            ?registered,
            "account type mismatch"
        );
        sign_out_quietly(auth).await;
        return Err(CampusError::RoleMismatch {
            selected: form.role,
            registered,
        });
    }

    tracing::info!(%user_id, role = %form.role, "login succeeded");
    Ok(session)
}

/// Ends the current session. The gate sends the user to the login screen.
pub async fn logout<A: AuthService>(auth: &A) -> Result<(), CampusError> {
    auth.sign_out().await?;
    tracing::info!("logged out");
    Ok(())
}

/// Rolls back a sign-in. A failure here is logged, not returned: the
/// caller already has the error that matters.
async fn sign_out_quietly<A: AuthService>(auth: &A) {
    if let Err(e) = auth.sign_out().await {
        tracing::warn!(error = %e, "sign-out after refused login failed");
    }
}

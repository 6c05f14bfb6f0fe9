//! Session gate: credential match and registration.
//!
//! Login is a trivial equality match against the `users` collection (the
//! backend offers nothing stronger) and only the identity object it yields
//! matters to the rest of the engine. Persisting that identity across page
//! lifetimes is the caller's concern.

use tracing::debug;

use super::error::Error;
use super::identity::{Role, User};
use super::ports::ResourceStore;
use super::records::NewUser;

/// What the login form collects. `role` is the tab the user signed in
/// under; an account only matches when its stored role agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Resolve a session identity from credentials.
///
/// Email comparison is case-insensitive; password and role are exact.
///
/// # Errors
/// [`Error::Unauthorized`] when no account matches; [`Error::ReloadFailed`]
/// when the user collection cannot be fetched.
pub async fn login(store: &dyn ResourceStore, credentials: &Credentials) -> Result<User, Error> {
    let users = store
        .list_users()
        .await
        .map_err(|source| Error::ReloadFailed { source })?;
    users
        .into_iter()
        .find(|user| {
            user.email.eq_ignore_ascii_case(&credentials.email)
                && user.password.as_deref() == Some(credentials.password.as_str())
                && user.role == credentials.role
        })
        .map(|user| {
            debug!(name = %user.name, "session identity resolved");
            user
        })
        .ok_or(Error::Unauthorized)
}

/// Create a new account. The caller signs in separately afterwards.
///
/// # Errors
/// [`Error::RemoteMutationFailed`] when the create request fails.
pub async fn register(store: &dyn ResourceStore, draft: &NewUser) -> Result<User, Error> {
    store
        .create_user(draft)
        .await
        .map_err(|source| Error::RemoteMutationFailed { source })
}

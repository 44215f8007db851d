//! Identity resolution — the login decision tree.
//!
//! A username is first tried as a local admin access name; failing that it
//! is treated as a federated identity and confirmed against the external
//! single-sign-on service on every login (this system stores no password for
//! federated users). First-time federated logins register exactly one user
//! row, keyed by the provider's unique external id.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use refectory_core::store::DiningStore;
use refectory_sso::IdentityProvider;

use crate::{AppState, error::ApiError, token::TokenPair};

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash an admin password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2: {e}")))
}

/// Constant-shape verification; all failure modes collapse to `false`.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Login ───────────────────────────────────────────────────────────────────

/// Resolve `username`/`password` to a token pair.
///
/// Every failure path — unknown admin, wrong local password, upstream
/// rejection, upstream outage — answers `InvalidCredentials`; the caller
/// learns nothing about which credential source balked.
pub async fn authenticate<S, P>(
  state: &AppState<S, P>,
  username: &str,
  password: &str,
) -> Result<TokenPair, ApiError>
where
  S: DiningStore,
  P: IdentityProvider,
{
  // Local admins first: an admin access name shadows any federated id.
  if let Some(admin) = state
    .store
    .admin_by_access_name(username)
    .await
    .map_err(ApiError::store)?
  {
    if !verify_password(password, &admin.password_hash) {
      return Err(ApiError::InvalidCredentials);
    }
    return Ok(state.tokens.issue_pair(admin.user_id, true)?);
  }

  // Federated path: the provider re-validates the password on every login.
  let identity = match state.sso.authenticate(username, password).await {
    Ok(identity) => identity,
    Err(e) => {
      tracing::debug!(error = %e, "sso login failed");
      return Err(ApiError::InvalidCredentials);
    }
  };

  let user = match state
    .store
    .user_by_external_id(&identity.external_id)
    .await
    .map_err(ApiError::store)?
  {
    // Returning user: keep the stored admin flag.
    Some(user) => user,
    // First login: register exactly one row under the validated identity.
    None => {
      tracing::info!(external_id = %identity.external_id, "registering first-time user");
      state
        .store
        .create_user(&identity.display_name, Some(&identity.external_id), false)
        .await
        .map_err(ApiError::store)?
    }
  };

  Ok(state.tokens.issue_pair(user.id, user.is_admin)?)
}

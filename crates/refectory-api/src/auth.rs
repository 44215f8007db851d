//! Bearer-token extractors and privilege checks.
//!
//! [`CurrentUser`] / [`CurrentAdmin`] in a handler signature mean the
//! request carried a valid access token (and, for the latter, an admin
//! account behind it). Ownership checks stay in the handlers, composed from
//! [`require_self_or_admin`].

use axum::{extract::FromRequestParts, http::{HeaderMap, request::Parts}};
use refectory_core::{
  store::DiningStore,
  user::{Admin, Privilege, User},
};
use refectory_sso::IdentityProvider;

use crate::{AppState, error::ApiError};

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized)
}

/// A caller with a verified access token and a live user row.
pub struct CurrentUser(pub User);

/// A caller whose user is flagged admin *and* has a linked admin record.
pub struct CurrentAdmin {
  pub user:  User,
  pub admin: Admin,
}

impl CurrentAdmin {
  /// `Forbidden` unless this admin's privilege set grants `privilege`.
  pub fn require(&self, privilege: Privilege) -> Result<(), ApiError> {
    if self.admin.privileges.contains(privilege) {
      Ok(())
    } else {
      Err(ApiError::Forbidden)
    }
  }
}

/// `Forbidden` unless the caller owns the resource or is an admin.
pub fn require_self_or_admin(caller: &User, owner_id: i64) -> Result<(), ApiError> {
  if caller.id == owner_id || caller.is_admin {
    Ok(())
  } else {
    Err(ApiError::Forbidden)
  }
}

/// Resolve the token in `headers` to a live user.
///
/// Fails `NotFound` if the user row was deleted after the token was issued.
pub async fn user_from_headers<S, P>(
  state: &AppState<S, P>,
  headers: &HeaderMap,
) -> Result<User, ApiError>
where
  S: DiningStore,
  P: Send + Sync,
{
  let token = bearer_token(headers)?;
  let ctx = state.tokens.verify(token)?;
  state
    .store
    .user(ctx.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", ctx.user_id)))
}

/// As [`user_from_headers`], additionally requiring admin standing.
pub async fn admin_from_headers<S, P>(
  state: &AppState<S, P>,
  headers: &HeaderMap,
) -> Result<CurrentAdmin, ApiError>
where
  S: DiningStore,
  P: Send + Sync,
{
  let user = user_from_headers(state, headers).await?;
  if !user.is_admin {
    return Err(ApiError::Forbidden);
  }
  let admin = state
    .store
    .admin_by_user_id(user.id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Forbidden)?;
  Ok(CurrentAdmin { user, admin })
}

impl<S, P> FromRequestParts<AppState<S, P>> for CurrentUser
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    user_from_headers(state, &parts.headers).await.map(CurrentUser)
  }
}

impl<S, P> FromRequestParts<AppState<S, P>> for CurrentAdmin
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    admin_from_headers(state, &parts.headers).await
  }
}

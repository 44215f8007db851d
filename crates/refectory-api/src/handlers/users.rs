//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Auth | Notes |
//! |--------|------|------|-------|
//! | `POST` | `/users/token` | none | username + password → token pair |
//! | `POST` | `/users/token/refresh` | none | stale access + live refresh → new pair |
//! | `GET`  | `/users/me` | user | |
//! | `GET`  | `/users/:id` | self or admin | |
//! | `PUT`  | `/users/:id` | self or admin | display name / avatar |
//! | `POST` | `/users/admin/register` | admin, or open while no admin exists | |
//! | `GET`  | `/users/admin/me` | admin | |

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use refectory_core::{
  store::DiningStore,
  user::{Admin, Privilege, PrivilegeSet, User, UserUpdate},
};
use refectory_sso::IdentityProvider;
use serde::Deserialize;

use crate::{
  AppState,
  auth::{CurrentAdmin, CurrentUser, admin_from_headers, require_self_or_admin},
  error::ApiError,
  identity,
  token::TokenPair,
};

// ─── Login + refresh ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /users/token`
pub async fn login<S, P>(
  State(state): State<AppState<S, P>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<TokenPair>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  identity::authenticate(&state, &body.username, &body.password)
    .await
    .map(Json)
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
  pub access_token:  String,
  pub refresh_token: String,
}

/// `POST /users/token/refresh`
pub async fn refresh<S, P>(
  State(state): State<AppState<S, P>>,
  Json(body): Json<RefreshBody>,
) -> Result<Json<TokenPair>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  Ok(Json(state.tokens.refresh(&body.access_token, &body.refresh_token)?))
}

// ─── Profiles ─────────────────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn me<S, P>(CurrentUser(user): CurrentUser) -> Json<User>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  Json(user)
}

/// `GET /users/:id` — own profile, or any profile for admins.
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(caller): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<User>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  require_self_or_admin(&caller, id)?;
  let user = state
    .store
    .user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

/// `PUT /users/:id` — own profile, or any profile for admins.
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(caller): CurrentUser,
  Path(id): Path<i64>,
  Json(body): Json<UserUpdate>,
) -> Result<Json<User>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  require_self_or_admin(&caller, id)?;
  let user = state.store.update_user(id, body).await.map_err(ApiError::store)?;
  Ok(Json(user))
}

// ─── Admin accounts ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterAdminBody {
  pub access_name: String,
  pub password:    String,
  /// Capabilities to grant; omitted means all.
  pub privileges:  Option<Vec<Privilege>>,
}

/// `POST /users/admin/register`
///
/// Gated behind an existing admin holding the `users` capability — except
/// while the admin table is empty, when the first registration bootstraps
/// the deployment.
pub async fn register_admin<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
  Json(body): Json<RegisterAdminBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let bootstrap = state.store.admin_count().await.map_err(ApiError::store)? == 0;
  if !bootstrap {
    let caller = admin_from_headers(&state, &headers).await?;
    caller.require(Privilege::Users)?;
  }

  let hash = identity::hash_password(&body.password)?;
  let privileges = body
    .privileges
    .map(PrivilegeSet::new)
    .unwrap_or_else(PrivilegeSet::all);

  let (_, admin) = state
    .store
    .register_admin(&body.access_name, &hash, &privileges)
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(admin)))
}

/// `GET /users/admin/me`
pub async fn admin_me<S, P>(admin: CurrentAdmin) -> Json<Admin>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  Json(admin.admin)
}

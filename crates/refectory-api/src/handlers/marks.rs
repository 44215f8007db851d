//! Handlers for `/marks` endpoints — per-user dish bookmarks.
//!
//! Marks are private: listing and reading are self-only, deletion is
//! owner-only (enforced in the store, atomically with the counter).

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use refectory_core::{
  mark::{Mark, NewMark},
  store::DiningStore,
};
use refectory_sso::IdentityProvider;
use serde_json::json;

use crate::{AppState, auth::CurrentUser, error::ApiError};

use super::comments::PageParams;

/// `POST /marks`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewMark>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  if body.user_id != user.id {
    return Err(ApiError::Forbidden);
  }
  let mark = state.store.add_mark(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(mark)))
}

/// `GET /marks/user/:uid` — self only.
pub async fn by_user<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(uid): Path<i64>,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Mark>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  if user.id != uid {
    return Err(ApiError::Forbidden);
  }
  let marks = state
    .store
    .marks_by_user(uid, page.skip, page.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(marks))
}

/// `GET /marks/dish/:did/count`
pub async fn count_for_dish<S, P>(
  State(state): State<AppState<S, P>>,
  Path(did): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let count = state
    .store
    .mark_count_for_dish(did)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "dish_id": did, "count": count })))
}

/// `GET /marks/:id` — owner only.
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<Mark>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let mark = state
    .store
    .mark(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("mark {id} not found")))?;
  if mark.user_id != user.id {
    return Err(ApiError::Forbidden);
  }
  Ok(Json(mark))
}

/// `DELETE /marks/:id` — owner only.
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  state
    .store
    .delete_mark(id, user.id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

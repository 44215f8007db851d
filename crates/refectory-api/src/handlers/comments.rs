//! Handlers for `/comments` endpoints — ratings and their text.
//!
//! Creating a comment for another user answers 401 unless the caller is an
//! admin; editing and deleting are owner-or-admin. The store folds every
//! mutation into the dish's aggregates atomically.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use refectory_core::{
  comment::{Comment, CommentUpdate, NewComment},
  store::DiningStore,
};
use refectory_sso::IdentityProvider;
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

use super::default_limit;

/// `GET /comments/:id`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  Path(id): Path<i64>,
) -> Result<Json<Comment>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let comment = state
    .store
    .comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(comment))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
  #[serde(default)]
  pub skip: usize,
  #[serde(default = "default_limit")]
  pub limit: usize,
}

/// `GET /comments/dish/:dish_id`
pub async fn by_dish<S, P>(
  State(state): State<AppState<S, P>>,
  Path(dish_id): Path<i64>,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let comments = state
    .store
    .comments_by_dish(dish_id, page.skip, page.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comments))
}

/// `POST /comments`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  if body.user_id != user.id && !user.is_admin {
    return Err(ApiError::Unauthorized);
  }
  let comment = state.store.create_comment(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /comments/:id` — owner or admin.
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
  Json(body): Json<CommentUpdate>,
) -> Result<Json<Comment>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let existing = state
    .store
    .comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  if existing.user_id != user.id && !user.is_admin {
    return Err(ApiError::Forbidden);
  }

  let comment = state
    .store
    .update_comment(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(comment))
}

/// `DELETE /comments/:id` — owner or admin.
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let existing = state
    .store
    .comment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  if existing.user_id != user.id && !user.is_admin {
    return Err(ApiError::Forbidden);
  }

  state.store.delete_comment(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

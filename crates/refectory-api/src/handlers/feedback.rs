//! Handlers for `/feedback` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use refectory_core::{
  feedback::{Feedback, FeedbackReply, NewFeedback},
  store::DiningStore,
  user::Privilege,
};
use refectory_sso::IdentityProvider;
use serde::Deserialize;

use crate::{
  AppState,
  auth::{CurrentAdmin, CurrentUser, require_self_or_admin},
  error::ApiError,
};

use super::comments::PageParams;

/// `POST /feedback` — one may only file feedback as oneself.
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewFeedback>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  if body.user_id != user.id {
    return Err(ApiError::Forbidden);
  }
  let feedback = state.store.create_feedback(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(feedback)))
}

/// `GET /feedback/:id` — author or admin.
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(id): Path<i64>,
) -> Result<Json<Feedback>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let feedback = state
    .store
    .feedback(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("feedback {id} not found")))?;
  require_self_or_admin(&user, feedback.user_id)?;
  Ok(Json(feedback))
}

/// `GET /feedback/user/:uid` — own feedback, or anyone's for admins.
pub async fn by_user<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Path(uid): Path<i64>,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Feedback>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  require_self_or_admin(&user, uid)?;
  let feedback = state
    .store
    .feedback_by_user(uid, page.skip, page.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub id:      i64,
  pub content: String,
}

/// `PUT /feedback` — authors may rewrite their own message.
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Feedback>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let feedback = state
    .store
    .update_feedback(body.id, user.id, &body.content)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
  /// Feedback entry being answered.
  pub to:      i64,
  pub content: String,
}

/// `PUT /feedback/reply` — admins answer; the reply is attributed to the
/// calling admin, not whatever the body claims.
pub async fn reply<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Json(body): Json<ReplyBody>,
) -> Result<Json<Feedback>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Feedback)?;
  let feedback = state
    .store
    .reply_feedback(FeedbackReply {
      feedback_id: body.to,
      user_id:     admin.user.id,
      content:     body.content,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(feedback))
}

#[derive(Debug, Deserialize)]
pub struct TargetParams {
  /// `true` → only answered entries, `false` → only pending, absent → all.
  pub replied: Option<bool>,
}

/// `GET /feedback/target/:tid?replied=` — admin triage view.
pub async fn by_target<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(tid): Path<i64>,
  Query(params): Query<TargetParams>,
) -> Result<Json<Vec<Feedback>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Feedback)?;
  let feedback = state
    .store
    .feedback_by_target(tid, params.replied)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(feedback))
}

//! API error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use refectory_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

use crate::token::TokenError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Login rejected. Deliberately carries no detail: upstream SSO failures,
  /// unknown accounts and wrong passwords all look identical to the caller.
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("token expired")]
  TokenExpired,

  #[error("invalid token")]
  TokenInvalid,

  /// Missing or malformed Authorization header.
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Backend fault. Logged in full; the response body stays generic.
  #[error("internal error")]
  Internal(String),
}

impl ApiError {
  /// Classify a store error into the client-facing taxonomy.
  pub fn store<E: Into<CoreError>>(err: E) -> Self { Self::from(err.into()) }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::UserNotFound(_)
      | CoreError::CanteenNotFound(_)
      | CoreError::DishNotFound(_)
      | CoreError::CommentNotFound(_)
      | CoreError::MarkNotFound(_)
      | CoreError::FeedbackNotFound(_)
      | CoreError::CarouselNotFound(_)
      | CoreError::NewDishFlagNotFound(_) => ApiError::NotFound(e.to_string()),
      CoreError::DuplicateRating { .. } => ApiError::Conflict(e.to_string()),
      CoreError::NotMarkOwner(_) | CoreError::NotFeedbackOwner(_) => {
        ApiError::Forbidden
      }
      CoreError::AccessNameTaken(_) | CoreError::UnknownPrivilege(_) => {
        ApiError::BadRequest(e.to_string())
      }
      CoreError::Storage(msg) => ApiError::Internal(msg),
    }
  }
}

impl From<TokenError> for ApiError {
  fn from(e: TokenError) -> Self {
    match e {
      TokenError::Expired => ApiError::TokenExpired,
      TokenError::Invalid => ApiError::TokenInvalid,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::InvalidCredentials
      | ApiError::TokenExpired
      | ApiError::TokenInvalid
      | ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal(detail) => {
        // Full detail goes to the log, never to the caller.
        tracing::error!(%detail, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"refectory\""),
      );
    }
    res
  }
}

//! Error types for `refectory-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("canteen not found: {0}")]
  CanteenNotFound(i64),

  #[error("dish not found: {0}")]
  DishNotFound(i64),

  #[error("comment not found: {0}")]
  CommentNotFound(i64),

  #[error("mark not found: {0}")]
  MarkNotFound(i64),

  #[error("feedback not found: {0}")]
  FeedbackNotFound(i64),

  #[error("carousel not found: {0}")]
  CarouselNotFound(i64),

  #[error("new-dish flag not found: {0}")]
  NewDishFlagNotFound(i64),

  /// One rating per (user, dish) pair; the second attempt is rejected.
  #[error("user {user_id} has already rated dish {dish_id}")]
  DuplicateRating { user_id: i64, dish_id: i64 },

  #[error("mark {0} belongs to another user")]
  NotMarkOwner(i64),

  #[error("feedback {0} belongs to another user")]
  NotFeedbackOwner(i64),

  #[error("admin access name already taken: {0:?}")]
  AccessNameTaken(String),

  #[error("unknown privilege token: {0:?}")]
  UnknownPrivilege(String),

  /// A backend fault the caller cannot act on (I/O, corrupt row, ...).
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

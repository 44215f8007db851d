//! User feedback threads: a message aimed at a target (canteen, dish, or
//! the service itself), optionally answered once by an admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
  pub id:      i64,
  pub user_id: i64,
  pub content: String,
  pub time:    DateTime<Utc>,
  /// What the feedback is about — a canteen id by convention.
  pub towards: i64,
  pub reply:      Option<String>,
  pub reply_time: Option<DateTime<Utc>>,
  pub reply_uid:  Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
  pub user_id: i64,
  pub content: String,
  pub towards: i64,
}

/// An admin's answer to an existing feedback entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackReply {
  pub feedback_id: i64,
  pub user_id:     i64,
  pub content:     String,
}

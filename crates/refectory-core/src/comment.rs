//! Comments — a rating plus optional text attached to a dish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id:      i64,
  pub user_id: i64,
  pub dish_id: i64,
  /// Free text; a comment may carry only a vote.
  pub content: Option<String>,
  pub vote:    f64,
  pub content_visible: bool,
  pub time:    DateTime<Utc>,
  /// Optional parent comment this one replies to. No ownership implied;
  /// the parent may be deleted independently.
  pub reply_to: Option<i64>,
}

impl Comment {
  /// Whether this comment counts towards the dish's comment counter.
  /// Whitespace-only text does not.
  pub fn has_content(&self) -> bool {
    has_text(self.content.as_deref())
  }
}

pub fn has_text(content: Option<&str>) -> bool {
  content.is_some_and(|c| !c.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
  pub user_id: i64,
  pub dish_id: i64,
  pub content: Option<String>,
  pub vote:    f64,
  pub reply_to: Option<i64>,
}

/// Replacement content and vote for an edit; both fields are applied.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentUpdate {
  pub content: Option<String>,
  pub vote:    f64,
}

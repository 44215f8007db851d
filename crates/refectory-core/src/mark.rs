//! Marks — per-user dish bookmarks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
  pub id:      i64,
  pub user_id: i64,
  pub dish_id: i64,
  pub time:    DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMark {
  pub user_id: i64,
  pub dish_id: i64,
}

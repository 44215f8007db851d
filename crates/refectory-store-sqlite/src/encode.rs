//! Decoding helpers between SQLite rows and domain types.
//!
//! Timestamps are stored as RFC 3339 strings and privilege sets as
//! comma-delimited text, so rows with those columns come out of the query
//! closures as `Raw*` structs and are decoded on the async side, where the
//! richer error type is available. Rows made of plain columns (dishes,
//! canteens, carousels) are built directly in the closures.

use chrono::{DateTime, Utc};
use refectory_core::{
  comment::Comment,
  feedback::Feedback,
  mark::Mark,
  user::{Admin, PrivilegeSet},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub id:      i64,
  pub user_id: i64,
  pub dish_id: i64,
  pub content: Option<String>,
  pub vote:    f64,
  pub content_visible: bool,
  pub time:    String,
  pub reply_to: Option<i64>,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      user_id: row.get(1)?,
      dish_id: row.get(2)?,
      content: row.get(3)?,
      vote:    row.get(4)?,
      content_visible: row.get(5)?,
      time:    row.get(6)?,
      reply_to: row.get(7)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:      self.id,
      user_id: self.user_id,
      dish_id: self.dish_id,
      content: self.content,
      vote:    self.vote,
      content_visible: self.content_visible,
      time:    decode_dt(&self.time)?,
      reply_to: self.reply_to,
    })
  }
}

/// All columns of a `comments` row, in `RawComment::from_row` order.
pub const COMMENT_COLUMNS: &str =
  "id, user_id, dish_id, content, vote, content_visible, time, reply_to";

/// Raw strings read directly from a `marks` row.
pub struct RawMark {
  pub id:      i64,
  pub user_id: i64,
  pub dish_id: i64,
  pub time:    String,
}

impl RawMark {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      user_id: row.get(1)?,
      dish_id: row.get(2)?,
      time:    row.get(3)?,
    })
  }

  pub fn into_mark(self) -> Result<Mark> {
    Ok(Mark {
      id:      self.id,
      user_id: self.user_id,
      dish_id: self.dish_id,
      time:    decode_dt(&self.time)?,
    })
  }
}

/// Raw strings read directly from a `feedbacks` row.
pub struct RawFeedback {
  pub id:         i64,
  pub user_id:    i64,
  pub content:    String,
  pub time:       String,
  pub towards:    i64,
  pub reply:      Option<String>,
  pub reply_time: Option<String>,
  pub reply_uid:  Option<i64>,
}

impl RawFeedback {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      content:    row.get(2)?,
      time:       row.get(3)?,
      towards:    row.get(4)?,
      reply:      row.get(5)?,
      reply_time: row.get(6)?,
      reply_uid:  row.get(7)?,
    })
  }

  pub fn into_feedback(self) -> Result<Feedback> {
    Ok(Feedback {
      id:         self.id,
      user_id:    self.user_id,
      content:    self.content,
      time:       decode_dt(&self.time)?,
      towards:    self.towards,
      reply:      self.reply,
      reply_time: self.reply_time.as_deref().map(decode_dt).transpose()?,
      reply_uid:  self.reply_uid,
    })
  }
}

/// All columns of a `feedbacks` row, in `RawFeedback::from_row` order.
pub const FEEDBACK_COLUMNS: &str =
  "id, user_id, content, time, towards, reply, reply_time, reply_uid";

/// Raw strings read directly from an `admins` row.
pub struct RawAdmin {
  pub id:          i64,
  pub user_id:     i64,
  pub access_name: String,
  pub password_hash: String,
  pub privileges:  String,
}

impl RawAdmin {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      user_id:     row.get(1)?,
      access_name: row.get(2)?,
      password_hash: row.get(3)?,
      privileges:  row.get(4)?,
    })
  }

  pub fn into_admin(self) -> Result<Admin> {
    Ok(Admin {
      id:          self.id,
      user_id:     self.user_id,
      access_name: self.access_name,
      password_hash: self.password_hash,
      privileges:  PrivilegeSet::parse(&self.privileges).map_err(Error::Core)?,
    })
  }
}

/// All columns of an `admins` row, in `RawAdmin::from_row` order.
pub const ADMIN_COLUMNS: &str =
  "id, user_id, access_name, password_hash, privileges";

//! Incremental maintenance of a dish's rating aggregates.
//!
//! The invariant: `average_vote` is always the arithmetic mean of exactly
//! `count_of_votes` vote values for the comments currently attached to the
//! dish, and `count_of_comments` counts only comments with non-empty text.
//! Every transition (comment created, revised, erased) moves the aggregates
//! incrementally — no rescan of the comment table.
//!
//! Callers must apply these transitions inside the same storage transaction
//! that writes the comment row, or concurrent ratings on one dish can lose
//! updates.

use serde::{Deserialize, Serialize};

/// Votes live on a 0–5 scale; a dish nobody has rated sits at the midpoint.
pub const VOTE_SCALE_MIDPOINT: f64 = 2.5;

/// The derived rating fields of one dish, detached from the rest of the row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
  pub average_vote:      f64,
  pub count_of_votes:    i64,
  pub count_of_comments: i64,
}

impl Default for RatingState {
  fn default() -> Self {
    Self {
      average_vote:      VOTE_SCALE_MIDPOINT,
      count_of_votes:    0,
      count_of_comments: 0,
    }
  }
}

impl RatingState {
  /// A new comment with `vote` arrives.
  pub fn record(&mut self, vote: f64, has_content: bool) {
    let n = self.count_of_votes as f64;
    self.average_vote = (self.average_vote * n + vote) / (n + 1.0);
    self.count_of_votes += 1;
    if has_content {
      self.count_of_comments += 1;
    }
  }

  /// An existing comment with `vote` is removed.
  ///
  /// Removing the last vote resets the average to the scale midpoint rather
  /// than dividing by zero.
  pub fn erase(&mut self, vote: f64, had_content: bool) {
    if self.count_of_votes <= 1 {
      self.average_vote = VOTE_SCALE_MIDPOINT;
      self.count_of_votes = 0;
    } else {
      let n = self.count_of_votes as f64;
      self.average_vote = (self.average_vote * n - vote) / (n - 1.0);
      self.count_of_votes -= 1;
    }
    if had_content {
      self.count_of_comments = (self.count_of_comments - 1).max(0);
    }
  }

  /// An existing comment changes its vote and possibly its content.
  ///
  /// The vote count is unchanged; the comment count moves only when the
  /// presence of text flipped.
  pub fn revise(
    &mut self,
    old_vote: f64,
    new_vote: f64,
    had_content: bool,
    has_content: bool,
  ) {
    if self.count_of_votes > 0 {
      let n = self.count_of_votes as f64;
      self.average_vote = (self.average_vote * n - old_vote + new_vote) / n;
    }
    match (had_content, has_content) {
      (false, true) => self.count_of_comments += 1,
      (true, false) => self.count_of_comments = (self.count_of_comments - 1).max(0),
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
  }

  #[test]
  fn record_moves_average_from_midpoint() {
    // An unrated dish sits at the midpoint, but the midpoint does not count
    // as a vote: the first real vote replaces it outright.
    let mut r = RatingState::default();
    r.record(5.0, true);
    assert_close(r.average_vote, 5.0);
    assert_eq!(r.count_of_votes, 1);
    assert_eq!(r.count_of_comments, 1);
  }

  #[test]
  fn full_lifecycle_replay() {
    let mut r = RatingState::default();

    r.record(5.0, false);
    assert_close(r.average_vote, 5.0);
    assert_eq!(r.count_of_votes, 1);

    r.record(3.0, true);
    assert_close(r.average_vote, 4.0);
    assert_eq!(r.count_of_votes, 2);

    // First comment's vote revised 5 → 1; remaining votes are {1, 3}.
    r.revise(5.0, 1.0, false, false);
    assert_close(r.average_vote, 2.0);
    assert_eq!(r.count_of_votes, 2);

    // Second comment (vote 3) removed.
    r.erase(3.0, true);
    assert_close(r.average_vote, 1.0);
    assert_eq!(r.count_of_votes, 1);
    assert_eq!(r.count_of_comments, 0);

    // Last comment removed: average returns to the midpoint, no division.
    r.erase(1.0, false);
    assert_close(r.average_vote, VOTE_SCALE_MIDPOINT);
    assert_eq!(r.count_of_votes, 0);
  }

  #[test]
  fn erase_last_vote_never_divides_by_zero() {
    let mut r = RatingState::default();
    r.record(4.5, true);
    r.erase(4.5, true);
    assert_close(r.average_vote, VOTE_SCALE_MIDPOINT);
    assert_eq!(r.count_of_votes, 0);
    assert_eq!(r.count_of_comments, 0);
  }

  #[test]
  fn replay_matches_arithmetic_mean() {
    let votes = [1.0, 2.0, 3.5, 5.0, 0.5, 4.0];
    let mut r = RatingState::default();
    for v in votes {
      r.record(v, false);
    }
    let mean = votes.iter().sum::<f64>() / votes.len() as f64;
    assert_close(r.average_vote, mean);
    assert_eq!(r.count_of_votes, votes.len() as i64);

    // Remove them in a different order; the mean tracks what remains.
    r.erase(5.0, false);
    r.erase(1.0, false);
    let remaining = [2.0, 3.5, 0.5, 4.0];
    assert_close(
      r.average_vote,
      remaining.iter().sum::<f64>() / remaining.len() as f64,
    );
  }

  #[test]
  fn revise_content_presence_moves_comment_count() {
    let mut r = RatingState::default();
    r.record(3.0, false);
    assert_eq!(r.count_of_comments, 0);

    r.revise(3.0, 3.0, false, true);
    assert_eq!(r.count_of_comments, 1);

    r.revise(3.0, 2.0, true, true);
    assert_eq!(r.count_of_comments, 1);

    r.revise(2.0, 2.0, true, false);
    assert_eq!(r.count_of_comments, 0);
  }
}

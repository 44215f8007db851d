//! Dish — the rating subject of the system.
//!
//! The four counter fields (`average_vote`, `count_of_votes`,
//! `count_of_comments`, `count_of_mark`) are derived state. Clients never
//! write them; they move only as a side effect of comment and mark
//! mutations, inside the same storage transaction (see [`crate::rating`]).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
  pub id:      i64,
  pub canteen: i64,
  pub floor:   i64,
  pub window:  i64,
  pub name:    String,
  pub price:   Option<f64>,
  pub measure: String,
  /// Opaque reference to the dish photo (object key or URL).
  pub image:   Option<String>,

  // Derived state — maintained by the store, never set by clients.
  pub average_vote:      f64,
  pub count_of_votes:    i64,
  pub count_of_comments: i64,
  pub count_of_mark:     i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDish {
  pub canteen: i64,
  pub floor:   i64,
  pub window:  i64,
  pub name:    String,
  pub price:   Option<f64>,
  #[serde(default = "default_measure")]
  pub measure: String,
  pub image:   Option<String>,
}

fn default_measure() -> String { "serving".to_string() }

/// Fields a dish update may change; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishUpdate {
  pub name:    Option<String>,
  pub price:   Option<f64>,
  pub measure: Option<String>,
  pub image:   Option<String>,
}

/// Price-only adjustment, kept separate because pricing changes are the
/// common administrative edit.
#[derive(Debug, Clone, Deserialize)]
pub struct Pricing {
  pub price:   f64,
  pub measure: String,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for listing dishes by location.
#[derive(Debug, Clone, Default)]
pub struct DishQuery {
  pub canteen: i64,
  /// Restrict to one floor of the canteen.
  pub floor:   Option<i64>,
  /// Restrict to one window; only meaningful together with `floor`.
  pub window:  Option<i64>,
  pub skip:    usize,
  pub limit:   usize,
}

impl DishQuery {
  pub fn canteen(canteen: i64) -> Self {
    Self { canteen, limit: 200, ..Self::default() }
  }
}

//! Canteens — the physical venues dishes are served in.
//!
//! Floors and windows are plain positional numbers scoped to a canteen
//! (floor 1, window 3); dishes carry them directly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canteen {
  pub id:           i64,
  pub name:         String,
  pub description:  String,
  pub campus:       String,
  pub image:        Option<String>,
  pub icon:         Option<String>,
  pub floors_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCanteen {
  pub name:         String,
  pub description:  String,
  pub campus:       String,
  pub image:        Option<String>,
  pub icon:         Option<String>,
  #[serde(default = "default_floors")]
  pub floors_count: i64,
}

fn default_floors() -> i64 { 1 }

/// Fields an update may change; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CanteenUpdate {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub image:       Option<String>,
}

//! Promotional surfaces: carousel banners and the "new dish" listing.

use serde::{Deserialize, Serialize};

/// A banner image, optionally scoped to one canteen (`None` = site-wide).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carousel {
  pub id:      i64,
  pub canteen: Option<i64>,
  /// Opaque reference to the banner image (object key or URL).
  pub image:   String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCarousel {
  pub canteen: Option<i64>,
  pub image:   String,
}

/// Flags an existing dish as newly introduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDishFlag {
  pub id:      i64,
  pub dish_id: i64,
}

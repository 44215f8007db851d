//! Request handlers, one module per resource group.

pub mod canteens;
pub mod comments;
pub mod dishes;
pub mod feedback;
pub mod marks;
pub mod promo;
pub mod users;

/// Default page size for listing endpoints.
pub(crate) const fn default_limit() -> usize { 100 }

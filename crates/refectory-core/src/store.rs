//! The `DiningStore` trait.
//!
//! Implemented by storage backends (e.g. `refectory-store-sqlite`). Higher
//! layers (`refectory-api`) depend on this abstraction, not on any concrete
//! backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Every mutation of
//! a dish's derived counters (ratings, comment count, mark count) must be
//! atomic with the comment/mark row it stems from: two concurrent ratings on
//! the same dish must serialise.

use std::future::Future;

use crate::{
  canteen::{Canteen, CanteenUpdate, NewCanteen},
  comment::{Comment, CommentUpdate, NewComment},
  dish::{Dish, DishQuery, DishUpdate, NewDish, Pricing},
  feedback::{Feedback, FeedbackReply, NewFeedback},
  mark::{Mark, NewMark},
  promo::{Carousel, NewCarousel, NewDishFlag},
  user::{Admin, PrivilegeSet, User, UserUpdate},
};

/// Abstraction over the dining-data backend.
pub trait DiningStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a user. `external_id`, when present, must be unique.
  fn create_user<'a>(
    &'a self,
    display_name: &'a str,
    external_id: Option<&'a str>,
    is_admin: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Retrieve a user by id. Returns `None` if not found.
  fn user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by the identity provider's durable id.
  fn user_by_external_id<'a>(
    &'a self,
    external_id: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Apply an update to a user's mutable profile fields.
  fn update_user(
    &self,
    id: i64,
    update: UserUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Admins ────────────────────────────────────────────────────────────

  /// Create the user + admin pair for a locally-credentialled account, in
  /// one atomic unit. Fails if `access_name` is taken.
  fn register_admin<'a>(
    &'a self,
    access_name: &'a str,
    password_hash: &'a str,
    privileges: &'a PrivilegeSet,
  ) -> impl Future<Output = Result<(User, Admin), Self::Error>> + Send + 'a;

  fn admin_by_access_name<'a>(
    &'a self,
    access_name: &'a str,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + 'a;

  fn admin_by_user_id(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + '_;

  /// Number of registered admins. Zero means first-run bootstrap.
  fn admin_count(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  // ── Canteens ──────────────────────────────────────────────────────────

  fn add_canteen(
    &self,
    canteen: NewCanteen,
  ) -> impl Future<Output = Result<Canteen, Self::Error>> + Send + '_;

  fn canteen(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Canteen>, Self::Error>> + Send + '_;

  fn list_canteens(
    &self,
  ) -> impl Future<Output = Result<Vec<Canteen>, Self::Error>> + Send + '_;

  fn canteens_by_campus<'a>(
    &'a self,
    campus: &'a str,
  ) -> impl Future<Output = Result<Vec<Canteen>, Self::Error>> + Send + 'a;

  fn update_canteen(
    &self,
    id: i64,
    update: CanteenUpdate,
  ) -> impl Future<Output = Result<Canteen, Self::Error>> + Send + '_;

  fn delete_canteen(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Dishes ────────────────────────────────────────────────────────────

  fn add_dish(
    &self,
    dish: NewDish,
  ) -> impl Future<Output = Result<Dish, Self::Error>> + Send + '_;

  fn dish(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Dish>, Self::Error>> + Send + '_;

  /// List dishes by location (canteen, optionally floor and window).
  fn dishes<'a>(
    &'a self,
    query: &'a DishQuery,
  ) -> impl Future<Output = Result<Vec<Dish>, Self::Error>> + Send + 'a;

  /// Substring search over dish names.
  fn search_dishes<'a>(
    &'a self,
    name: &'a str,
    skip: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Dish>, Self::Error>> + Send + 'a;

  fn update_dish(
    &self,
    id: i64,
    update: DishUpdate,
  ) -> impl Future<Output = Result<Dish, Self::Error>> + Send + '_;

  fn update_dish_pricing(
    &self,
    id: i64,
    pricing: Pricing,
  ) -> impl Future<Output = Result<Dish, Self::Error>> + Send + '_;

  fn delete_dish(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Comments + rating aggregates ──────────────────────────────────────

  /// Insert a comment and fold its vote into the dish's aggregates, as one
  /// atomic unit. Fails if the dish is missing or the (user, dish) pair
  /// already has a comment.
  fn create_comment(
    &self,
    comment: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn comment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn comments_by_dish(
    &self,
    dish_id: i64,
    skip: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Replace a comment's content and vote, revising the dish's aggregates
  /// in the same atomic unit.
  fn update_comment(
    &self,
    id: i64,
    update: CommentUpdate,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Delete a comment and back its vote out of the dish's aggregates, in
  /// the same atomic unit.
  fn delete_comment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Marks ─────────────────────────────────────────────────────────────

  /// Insert a mark and bump the dish's mark counter atomically.
  fn add_mark(
    &self,
    mark: NewMark,
  ) -> impl Future<Output = Result<Mark, Self::Error>> + Send + '_;

  fn mark(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Mark>, Self::Error>> + Send + '_;

  fn marks_by_user(
    &self,
    user_id: i64,
    skip: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Mark>, Self::Error>> + Send + '_;

  fn mark_count_for_dish(
    &self,
    dish_id: i64,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Delete a mark (owner only) and decrement the dish's mark counter
  /// atomically.
  fn delete_mark(
    &self,
    id: i64,
    requester_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Feedback ──────────────────────────────────────────────────────────

  fn create_feedback(
    &self,
    feedback: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  fn feedback(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Feedback>, Self::Error>> + Send + '_;

  fn feedback_by_user(
    &self,
    user_id: i64,
    skip: usize,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Feedback>, Self::Error>> + Send + '_;

  /// Feedback aimed at one target, optionally filtered on whether an admin
  /// has replied yet.
  fn feedback_by_target(
    &self,
    towards: i64,
    replied: Option<bool>,
  ) -> impl Future<Output = Result<Vec<Feedback>, Self::Error>> + Send + '_;

  /// Rewrite the message of one's own feedback.
  fn update_feedback<'a>(
    &'a self,
    id: i64,
    user_id: i64,
    content: &'a str,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + 'a;

  /// Attach (or replace) the admin reply on a feedback entry.
  fn reply_feedback(
    &self,
    reply: FeedbackReply,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  // ── Promotions ────────────────────────────────────────────────────────

  fn add_carousel(
    &self,
    carousel: NewCarousel,
  ) -> impl Future<Output = Result<Carousel, Self::Error>> + Send + '_;

  fn carousels_by_canteen(
    &self,
    canteen: i64,
  ) -> impl Future<Output = Result<Vec<Carousel>, Self::Error>> + Send + '_;

  fn delete_carousel(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flag an existing dish as new. Fails if the dish is missing.
  fn flag_new_dish(
    &self,
    dish_id: i64,
  ) -> impl Future<Output = Result<NewDishFlag, Self::Error>> + Send + '_;

  /// Dishes currently flagged as new within one canteen.
  fn new_dishes_by_canteen(
    &self,
    canteen: i64,
  ) -> impl Future<Output = Result<Vec<Dish>, Self::Error>> + Send + '_;

  fn unflag_new_dish(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

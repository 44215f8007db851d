//! HTTP layer of the Refectory dining backend.
//!
//! Exposes an axum [`Router`] over any [`DiningStore`] backend and any
//! [`IdentityProvider`] upstream, plus the bearer-token plumbing gluing
//! them together: login resolves identities across the local admin table
//! and the campus SSO, and every mutating endpoint runs behind the token
//! guard in [`auth`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod token;

pub use error::ApiError;
pub use token::{TokenPair, TokenService};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, patch, post, put},
};
use refectory_core::store::DiningStore;
use refectory_sso::IdentityProvider;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{canteens, comments, dishes, feedback, marks, promo, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged
/// with `REFECTORY_`-prefixed environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,

  /// Token signing secret. Absent → development fallback (with a warning).
  #[serde(default)]
  pub secret_key: Option<String>,
  #[serde(default = "default_access_ttl")]
  pub access_token_ttl_minutes: i64,
  #[serde(default = "default_refresh_ttl")]
  pub refresh_token_ttl_days: i64,

  #[serde(default = "default_sso_base_url")]
  pub sso_base_url: String,
  #[serde(default = "default_sso_service_url")]
  pub sso_service_url: String,
  #[serde(default = "default_sso_timeout")]
  pub sso_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_database_path() -> PathBuf { PathBuf::from("refectory.db") }
fn default_access_ttl() -> i64 { 30 }
fn default_refresh_ttl() -> i64 { 14 }
fn default_sso_base_url() -> String { "https://sso.campus.example/".to_string() }
fn default_sso_service_url() -> String {
  "https://dining.campus.example/".to_string()
}
fn default_sso_timeout() -> u64 { 10 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, P> {
  pub store:  Arc<S>,
  pub sso:    Arc<P>,
  pub tokens: Arc<TokenService>,
}

impl<S, P> AppState<S, P> {
  pub fn new(store: S, sso: P, tokens: TokenService) -> Self {
    Self {
      store:  Arc::new(store),
      sso:    Arc::new(sso),
      tokens: Arc::new(tokens),
    }
  }
}

// Manual impl: `Arc` fields clone regardless of `S`/`P` bounds.
impl<S, P> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      sso:    self.sso.clone(),
      tokens: self.tokens.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  Router::new()
    // Users + auth
    .route("/users/token",          post(users::login::<S, P>))
    .route("/users/token/refresh",  post(users::refresh::<S, P>))
    .route("/users/me",             get(users::me::<S, P>))
    .route("/users/admin/register", post(users::register_admin::<S, P>))
    .route("/users/admin/me",       get(users::admin_me::<S, P>))
    .route(
      "/users/{id}",
      get(users::get_one::<S, P>).put(users::update::<S, P>),
    )
    // Canteens
    .route(
      "/canteens",
      get(canteens::list::<S, P>).post(canteens::create::<S, P>),
    )
    .route("/canteens/campus/{campus}", get(canteens::by_campus::<S, P>))
    .route(
      "/canteens/{id}",
      get(canteens::get_one::<S, P>)
        .put(canteens::update::<S, P>)
        .delete(canteens::delete::<S, P>),
    )
    // Dishes
    .route("/dishes",        post(dishes::create::<S, P>))
    .route("/dishes/search", get(dishes::search::<S, P>))
    .route(
      "/dishes/{id}",
      get(dishes::get_one::<S, P>)
        .put(dishes::update::<S, P>)
        .delete(dishes::delete::<S, P>),
    )
    .route("/dishes/{id}/pricing", patch(dishes::pricing::<S, P>))
    .route("/dishes/canteen/{canteen}",        get(dishes::by_canteen::<S, P>))
    .route("/dishes/canteen/{canteen}/random", get(dishes::random::<S, P>))
    .route("/dishes/canteen/{canteen}/{floor}", get(dishes::by_floor::<S, P>))
    .route(
      "/dishes/canteen/{canteen}/{floor}/{window}",
      get(dishes::by_window::<S, P>),
    )
    // Comments
    .route("/comments",                post(comments::create::<S, P>))
    .route("/comments/dish/{dish_id}", get(comments::by_dish::<S, P>))
    .route(
      "/comments/{id}",
      get(comments::get_one::<S, P>)
        .put(comments::update::<S, P>)
        .delete(comments::delete::<S, P>),
    )
    // Marks
    .route("/marks",                  post(marks::create::<S, P>))
    .route("/marks/user/{uid}",       get(marks::by_user::<S, P>))
    .route("/marks/dish/{did}/count", get(marks::count_for_dish::<S, P>))
    .route(
      "/marks/{id}",
      get(marks::get_one::<S, P>).delete(marks::delete::<S, P>),
    )
    // Feedback
    .route(
      "/feedback",
      post(feedback::create::<S, P>).put(feedback::update::<S, P>),
    )
    .route("/feedback/reply",        put(feedback::reply::<S, P>))
    .route("/feedback/user/{uid}",   get(feedback::by_user::<S, P>))
    .route("/feedback/target/{tid}", get(feedback::by_target::<S, P>))
    .route("/feedback/{id}",         get(feedback::get_one::<S, P>))
    // Promotions
    .route("/carousels", post(promo::create_carousel::<S, P>))
    .route("/carousels/canteen/{canteen}", get(promo::carousels::<S, P>))
    .route("/carousels/{id}", delete(promo::delete_carousel::<S, P>))
    .route("/new", post(promo::flag_new_dish::<S, P>))
    .route("/new/canteen/{canteen}", get(promo::new_dishes::<S, P>))
    .route("/new/{id}", delete(promo::unflag_new_dish::<S, P>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

//! Handlers for `/dishes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dishes/:id` | |
//! | `GET`  | `/dishes/search?s=&skip=&limit=` | substring match on name |
//! | `GET`  | `/dishes/canteen/:canteen` | whole canteen |
//! | `GET`  | `/dishes/canteen/:canteen/random` | the indecision endpoint |
//! | `GET`  | `/dishes/canteen/:canteen/:floor` | one floor |
//! | `GET`  | `/dishes/canteen/:canteen/:floor/:window` | one window |
//! | `POST` | `/dishes`, `PUT`/`DELETE` `/dishes/:id`, `PATCH` `/dishes/:id/pricing` | admin `dishes` capability |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rand_core::{OsRng, RngCore as _};
use refectory_core::{
  dish::{Dish, DishQuery, DishUpdate, NewDish, Pricing},
  store::DiningStore,
  user::Privilege,
};
use refectory_sso::IdentityProvider;
use serde::Deserialize;

use crate::{AppState, auth::CurrentAdmin, error::ApiError};

use super::default_limit;

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /dishes/:id`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  Path(id): Path<i64>,
) -> Result<Json<Dish>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let dish = state
    .store
    .dish(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("dish {id} not found")))?;
  Ok(Json(dish))
}

/// `GET /dishes/canteen/:canteen`
pub async fn by_canteen<S, P>(
  State(state): State<AppState<S, P>>,
  Path(canteen): Path<i64>,
) -> Result<Json<Vec<Dish>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let dishes = state
    .store
    .dishes(&DishQuery::canteen(canteen))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(dishes))
}

/// `GET /dishes/canteen/:canteen/:floor`
pub async fn by_floor<S, P>(
  State(state): State<AppState<S, P>>,
  Path((canteen, floor)): Path<(i64, i64)>,
) -> Result<Json<Vec<Dish>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let query = DishQuery { floor: Some(floor), ..DishQuery::canteen(canteen) };
  let dishes = state.store.dishes(&query).await.map_err(ApiError::store)?;
  Ok(Json(dishes))
}

/// `GET /dishes/canteen/:canteen/:floor/:window`
pub async fn by_window<S, P>(
  State(state): State<AppState<S, P>>,
  Path((canteen, floor, window)): Path<(i64, i64, i64)>,
) -> Result<Json<Vec<Dish>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let query = DishQuery {
    floor:  Some(floor),
    window: Some(window),
    ..DishQuery::canteen(canteen)
  };
  let dishes = state.store.dishes(&query).await.map_err(ApiError::store)?;
  Ok(Json(dishes))
}

/// `GET /dishes/canteen/:canteen/random` — pick something for the undecided.
pub async fn random<S, P>(
  State(state): State<AppState<S, P>>,
  Path(canteen): Path<i64>,
) -> Result<Json<Dish>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let dishes = state
    .store
    .dishes(&DishQuery::canteen(canteen))
    .await
    .map_err(ApiError::store)?;
  if dishes.is_empty() {
    return Err(ApiError::NotFound(format!("canteen {canteen} has no dishes")));
  }
  let pick = OsRng.next_u32() as usize % dishes.len();
  dishes
    .into_iter()
    .nth(pick)
    .map(Json)
    .ok_or_else(|| ApiError::Internal("random pick out of range".into()))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  /// Substring to look for in dish names.
  pub s: String,
  #[serde(default)]
  pub skip: usize,
  #[serde(default = "default_limit")]
  pub limit: usize,
}

/// `GET /dishes/search?s=<substring>`
pub async fn search<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Dish>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let dishes = state
    .store
    .search_dishes(&params.s, params.skip, params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(dishes))
}

// ─── Mutations ────────────────────────────────────────────────────────────────

/// `POST /dishes`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Json(body): Json<NewDish>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Dishes)?;
  let dish = state.store.add_dish(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(dish)))
}

/// `PUT /dishes/:id`
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
  Json(body): Json<DishUpdate>,
) -> Result<Json<Dish>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Dishes)?;
  let dish = state.store.update_dish(id, body).await.map_err(ApiError::store)?;
  Ok(Json(dish))
}

/// `PATCH /dishes/:id/pricing`
pub async fn pricing<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
  Json(body): Json<Pricing>,
) -> Result<Json<Dish>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Dishes)?;
  let dish = state
    .store
    .update_dish_pricing(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(dish))
}

/// `DELETE /dishes/:id`
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Dishes)?;
  state.store.delete_dish(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

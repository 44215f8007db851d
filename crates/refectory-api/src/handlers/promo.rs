//! Handlers for promotional surfaces: `/carousels` and `/new`.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use refectory_core::{
  dish::Dish,
  promo::{Carousel, NewCarousel, NewDishFlag},
  store::DiningStore,
  user::Privilege,
};
use refectory_sso::IdentityProvider;
use serde::Deserialize;

use crate::{AppState, auth::CurrentAdmin, error::ApiError};

// ─── Carousels ────────────────────────────────────────────────────────────────

/// `GET /carousels/canteen/:canteen` — that canteen's banners plus the
/// site-wide ones.
pub async fn carousels<S, P>(
  State(state): State<AppState<S, P>>,
  Path(canteen): Path<i64>,
) -> Result<Json<Vec<Carousel>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let banners = state
    .store
    .carousels_by_canteen(canteen)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(banners))
}

/// `POST /carousels`
pub async fn create_carousel<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Json(body): Json<NewCarousel>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Carousels)?;
  let banner = state.store.add_carousel(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(banner)))
}

/// `DELETE /carousels/:id`
pub async fn delete_carousel<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Carousels)?;
  state.store.delete_carousel(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── New-dish flags ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FlagBody {
  pub dish_id: i64,
}

/// `POST /new`
pub async fn flag_new_dish<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Json(body): Json<FlagBody>,
) -> Result<(StatusCode, Json<NewDishFlag>), ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Dishes)?;
  let flag = state
    .store
    .flag_new_dish(body.dish_id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(flag)))
}

/// `GET /new/canteen/:canteen`
pub async fn new_dishes<S, P>(
  State(state): State<AppState<S, P>>,
  Path(canteen): Path<i64>,
) -> Result<Json<Vec<Dish>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let dishes = state
    .store
    .new_dishes_by_canteen(canteen)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(dishes))
}

/// `DELETE /new/:id`
pub async fn unflag_new_dish<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Dishes)?;
  state.store.unflag_new_dish(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

//! Handlers for `/canteens` endpoints.
//!
//! Reads are open; mutation requires an admin with the `canteens`
//! capability.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use refectory_core::{
  canteen::{Canteen, CanteenUpdate, NewCanteen},
  store::DiningStore,
  user::Privilege,
};
use refectory_sso::IdentityProvider;

use crate::{AppState, auth::CurrentAdmin, error::ApiError};

/// `GET /canteens`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
) -> Result<Json<Vec<Canteen>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let canteens = state.store.list_canteens().await.map_err(ApiError::store)?;
  Ok(Json(canteens))
}

/// `GET /canteens/campus/:campus`
pub async fn by_campus<S, P>(
  State(state): State<AppState<S, P>>,
  Path(campus): Path<String>,
) -> Result<Json<Vec<Canteen>>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let canteens = state
    .store
    .canteens_by_campus(&campus)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(canteens))
}

/// `GET /canteens/:id`
pub async fn get_one<S, P>(
  State(state): State<AppState<S, P>>,
  Path(id): Path<i64>,
) -> Result<Json<Canteen>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  let canteen = state
    .store
    .canteen(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("canteen {id} not found")))?;
  Ok(Json(canteen))
}

/// `POST /canteens`
pub async fn create<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Json(body): Json<NewCanteen>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Canteens)?;
  let canteen = state.store.add_canteen(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(canteen)))
}

/// `PUT /canteens/:id`
pub async fn update<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
  Json(body): Json<CanteenUpdate>,
) -> Result<Json<Canteen>, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Canteens)?;
  let canteen = state
    .store
    .update_canteen(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(canteen))
}

/// `DELETE /canteens/:id`
pub async fn delete<S, P>(
  State(state): State<AppState<S, P>>,
  admin: CurrentAdmin,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: DiningStore + 'static,
  P: IdentityProvider + 'static,
{
  admin.require(Privilege::Canteens)?;
  state.store.delete_canteen(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminUser,
    cars::{
        dto::{CarsListResponse, CreateCarRequest, DeletedResponse, UpdateCarRequest},
        repo,
        repo::Car,
    },
    error::ApiError,
    extract::{parse_id, ApiJson},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars))
        .route("/cars/:id", get(get_car))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/cars", post(create_car))
        .route("/cars/:id", put(update_car))
        .route("/cars/:id", delete(delete_car))
}

#[instrument(skip(state))]
pub async fn list_cars(State(state): State<AppState>) -> Result<Json<CarsListResponse>, ApiError> {
    let cars = repo::list_all(&state.db).await?;
    Ok(Json(CarsListResponse {
        count: cars.len(),
        cars,
    }))
}

#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Car>, ApiError> {
    let id = parse_id(&id)?;
    let car = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(car))
}

#[instrument(skip(state, payload, _admin))]
pub async fn create_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<CreateCarRequest>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let new = payload.validate().map_err(ApiError::BadRequest)?;
    let car = repo::insert(&state.db, new).await?;
    info!(car_id = %car.id, brand = %car.brand, model = %car.model, "car created");
    Ok((StatusCode::CREATED, Json(car)))
}

#[instrument(skip(state, payload, _admin))]
pub async fn update_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateCarRequest>,
) -> Result<Json<Car>, ApiError> {
    let id = parse_id(&id)?;
    let current = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let merged = payload.merge_into(&current).map_err(ApiError::BadRequest)?;

    // The record may have vanished between the read and the write; the
    // update itself reports that, no lock is taken (last writer wins).
    let car = repo::update(&state.db, id, merged)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(car_id = %car.id, "car updated");
    Ok(Json(car))
}

#[instrument(skip(state, _admin))]
pub async fn delete_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    info!(car_id = %id, "car deleted");
    Ok(Json(DeletedResponse {
        message: "Deleted successfully".into(),
    }))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use anyhow::anyhow;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AdminUser,
    cars,
    error::ApiError,
    extract::{parse_id, ApiJson},
    reviews::{
        dto::{
            CreateReviewRequest, DeletedResponse, ReviewResponse, ReviewsListResponse,
            UpdateReviewRequest,
        },
        repo,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews))
        .route("/reviews/:id", get(get_review))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/:id", put(update_review))
        .route("/reviews/:id", delete(delete_review))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<ReviewsListResponse>, ApiError> {
    let reviews: Vec<ReviewResponse> = repo::list_all_enriched(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(ReviewsListResponse {
        count: reviews.len(),
        reviews,
    }))
}

#[instrument(skip(state))]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let id = parse_id(&id)?;
    let pair = repo::find_enriched(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(pair.into()))
}

#[instrument(skip(state, payload, _admin))]
pub async fn create_review(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let new = payload.validate().map_err(ApiError::BadRequest)?;

    // Referential check: a dangling carId is a client fault, hence 400
    // rather than 404. Existence is only guaranteed at creation time.
    if cars::repo::find_by_id(&state.db, new.car_id).await?.is_none() {
        warn!(car_id = %new.car_id, "review rejected: unknown car");
        return Err(ApiError::bad_request("Car with this carId not found"));
    }

    let review = repo::insert(&state.db, new).await?;
    let pair = repo::find_enriched(&state.db, review.id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow!("review vanished after insert")))?;

    info!(review_id = %review.id, car_id = %review.car_id, "review created");
    Ok((StatusCode::CREATED, Json(pair.into())))
}

#[instrument(skip(state, payload, _admin))]
pub async fn update_review(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let id = parse_id(&id)?;
    let (rating, comment) = payload.validate().map_err(ApiError::BadRequest)?;

    let review = repo::update_partial(&state.db, id, rating, comment)
        .await?
        .ok_or(ApiError::NotFound)?;

    let pair = repo::find_enriched(&state.db, review.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(review_id = %id, "review updated");
    Ok(Json(pair.into()))
}

#[instrument(skip(state, _admin))]
pub async fn delete_review(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    info!(review_id = %id, "review deleted");
    Ok(Json(DeletedResponse {
        message: "Deleted successfully".into(),
    }))
}

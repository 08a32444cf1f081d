use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::serializer::{self, RestaurantFeature, RestaurantFeatureCollection};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurant/",
            get(list_restaurants).post(create_restaurant),
        )
        .route(
            "/restaurant/{id}/",
            get(get_restaurant)
                .put(update_restaurant)
                .patch(partial_update_restaurant)
                .delete(delete_restaurant),
        )
}

/// Unparseable ids are reported as missing records.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::MalformedBody(e.body_text()))
}

#[utoipa::path(
    get,
    path = "/restaurant/",
    responses(
        (status = 200, description = "Every restaurant as a FeatureCollection", body = RestaurantFeatureCollection),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<RestaurantFeatureCollection>, ApiError> {
    let restaurants = state.with_repository(|repo| repo.list()).await?;

    Ok(Json(
        restaurants.iter().map(RestaurantFeature::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/restaurant/",
    request_body = RestaurantFeature,
    responses(
        (status = 201, description = "Restaurant created", body = RestaurantFeature),
        (status = 400, description = "Validation failed", body = crate::error::ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, payload))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RestaurantFeature>), ApiError> {
    let data = body(payload)?;
    let new_restaurant = serializer::decode_new(&data).map_err(ApiError::Validation)?;

    let restaurant = state
        .with_repository(move |repo| repo.create(&new_restaurant))
        .await?;
    info!(id = restaurant.id, %restaurant, "restaurant created");

    Ok((StatusCode::CREATED, Json(RestaurantFeature::from(&restaurant))))
}

#[utoipa::path(
    get,
    path = "/restaurant/{id}/",
    responses(
        (status = 200, description = "Restaurant details", body = RestaurantFeature),
        (status = 404, description = "Restaurant not found", body = crate::error::ApiErrorResponse),
    ),
    params(
        ("id" = i64, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantFeature>, ApiError> {
    let id = parse_id(&id)?;
    let restaurant = state
        .with_repository(move |repo| repo.get(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(RestaurantFeature::from(&restaurant)))
}

#[utoipa::path(
    put,
    path = "/restaurant/{id}/",
    request_body = RestaurantFeature,
    responses(
        (status = 200, description = "Restaurant replaced", body = RestaurantFeature),
        (status = 400, description = "Validation failed", body = crate::error::ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = crate::error::ApiErrorResponse),
    ),
    params(
        ("id" = i64, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, payload))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RestaurantFeature>, ApiError> {
    apply_update(state, &id, payload, false).await
}

#[utoipa::path(
    patch,
    path = "/restaurant/{id}/",
    request_body = RestaurantFeature,
    responses(
        (status = 200, description = "Restaurant updated", body = RestaurantFeature),
        (status = 400, description = "Validation failed", body = crate::error::ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = crate::error::ApiErrorResponse),
    ),
    params(
        ("id" = i64, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state, payload))]
pub async fn partial_update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RestaurantFeature>, ApiError> {
    apply_update(state, &id, payload, true).await
}

async fn apply_update(
    state: AppState,
    id: &str,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<RestaurantFeature>, ApiError> {
    // Unknown ids are reported before body errors.
    let id = parse_id(id)?;
    if state.with_repository(move |repo| repo.get(id)).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let data = body(payload)?;
    let changes = serializer::decode(&data, partial).map_err(ApiError::Validation)?;
    let restaurant = state
        .with_repository(move |repo| repo.update(id, &changes))
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(id, %restaurant, partial, "restaurant updated");

    Ok(Json(RestaurantFeature::from(&restaurant)))
}

#[utoipa::path(
    delete,
    path = "/restaurant/{id}/",
    responses(
        (status = 204, description = "Restaurant deleted"),
        (status = 404, description = "Restaurant not found", body = crate::error::ApiErrorResponse),
    ),
    params(
        ("id" = i64, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if !state.with_repository(move |repo| repo.delete(id)).await? {
        return Err(ApiError::NotFound);
    }
    info!(id, "restaurant deleted");

    Ok(StatusCode::NO_CONTENT)
}

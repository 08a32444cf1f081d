pub mod admin;
pub mod restaurant;

pub use admin::router as admin_router;
pub use restaurant::router as restaurant_router;

use std::sync::Arc;

use axum::{http::HeaderMap, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AdminCredentials;
use crate::error::ApiError;
use crate::repository::{RepoResult, RestaurantRepository};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn RestaurantRepository>,
    pub admin_credentials: Option<Arc<AdminCredentials>>,
}

impl AppState {
    /// Runs a repository call on the blocking pool.
    pub async fn with_repository<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RestaurantRepository) -> RepoResult<T> + Send + 'static,
    {
        let repository = self.repository.clone();
        let result = tokio::task::spawn_blocking(move || f(repository.as_ref()))
            .await
            .map_err(|e| ApiError::InternalError(format!("Repository task failed: {e}")))?;
        Ok(result?)
    }
}

/// Builds the whole HTTP surface: API root, restaurant endpoints, admin
/// screens and API docs.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .merge(restaurant_router())
        .merge(admin_router(state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiRoot {
    /// Absolute URL of the restaurant collection
    pub restaurant: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Links to the registered resources", body = ApiRoot),
    ),
    tag = "root"
)]
pub async fn api_root(headers: HeaderMap) -> Json<ApiRoot> {
    let host = headers
        .get("host")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");

    Json(ApiRoot {
        restaurant: format!("http://{host}/restaurant/"),
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api_root,
        restaurant::list_restaurants,
        restaurant::create_restaurant,
        restaurant::get_restaurant,
        restaurant::update_restaurant,
        restaurant::partial_update_restaurant,
        restaurant::delete_restaurant,
    ),
    components(
        schemas(
            ApiRoot,
            crate::geometry::MultiPointGeometry,
            crate::geometry::MultiPointType,
            crate::serializer::FeatureType,
            crate::serializer::FeatureCollectionType,
            crate::serializer::RestaurantProperties,
            crate::serializer::RestaurantFeature,
            crate::serializer::RestaurantFeatureCollection,
            crate::error::ApiErrorResponse
        )
    ),
    tags(
        (name = "root", description = "API root"),
        (name = "restaurants", description = "Restaurant GeoJSON endpoints")
    ),
    info(
        title = "Geo Restaurant API",
        description = "Restaurants with MultiPoint locations (EPSG:4326) as GeoJSON Features",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

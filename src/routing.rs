//! Application router configuration.

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState, Error,
    api::{get_api_endpoint, post_api_endpoint},
    endpoints,
};

/// Return a router with all the app's routes.
///
/// Any origin may call the API, since the list has no notion of users.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::API, get(get_api_endpoint).post(post_api_endpoint))
        .route(
            endpoints::LEGACY_API,
            get(get_api_endpoint).post(post_api_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Layers (outermost first): CORS → request tracing → body size limit.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let body_limit = ctx.max_upload_bytes;

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/import/xml", post(endpoints::import::xml))
        .route("/import/apple-health", post(endpoints::import::apple_health))
        .route("/predict", post(endpoints::predict::predict))
        .route(
            "/assessments",
            post(endpoints::assessments::create)
                .get(endpoints::assessments::list)
                .delete(endpoints::assessments::clear),
        )
        .route("/assessments/latest", get(endpoints::assessments::latest))
        .route("/dashboard", get(endpoints::dashboard::dashboard))
        .route("/generate-feedback", post(endpoints::feedback::generate))
        .route("/chat", post(endpoints::chat::send))
        .route("/chat/:id", delete(endpoints::chat::reset))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

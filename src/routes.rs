// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::panic_response, handlers::comments, state::AppState};

/// Assembles the main application router.
///
/// * Mounts the manga comment routes.
/// * Applies global middleware (Trace, CORS, panic recovery).
/// * Injects global state (query handle, config).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let manga_routes = Router::new().route("/{id}/comments", get(comments::list_manga_comments));

    Router::new()
        .nest("/api/manga", manga_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Panics answer the same 500 envelope as other failures.
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}

/// Read-only CORS. Any origin unless an allow-list is configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

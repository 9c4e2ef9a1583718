use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PERMISSION_PUZZLES_READ, PERMISSION_PUZZLES_WRITE};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected::puzzles, public};
use crate::middleware::{authenticate, rate_limit, require_permission};
use crate::state::AppState;

/// Builds the full application router.
///
/// Request flow: trace → panic recovery → CORS → rate limit → authenticate →
/// permission route layer → handler.
pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/v1/healthcheck", get(public::healthcheck))
        .merge(puzzle_read_routes())
        .merge(puzzle_write_routes())
        .method_not_allowed_fallback(|method: Method| async move { ApiError::method_not_allowed(&method) })
        .fallback(|| async { ApiError::not_found() })
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
        .layer(CatchPanicLayer::custom(recover_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn puzzle_read_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/puzzles", get(puzzles::list))
        .route("/v1/puzzles/:id", get(puzzles::show))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_permission(PERMISSION_PUZZLES_READ, req, next)
        }))
}

fn puzzle_write_routes() -> Router<AppState> {
    use axum::routing::{patch, post};

    Router::new()
        .route("/v1/puzzles", post(puzzles::create))
        .route(
            "/v1/puzzles/:id",
            patch(puzzles::update).delete(puzzles::delete),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_permission(PERMISSION_PUZZLES_WRITE, req, next)
        }))
}

/// Turns a handler panic into the generic 500 body instead of a dropped connection
fn recover_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!("Handler panicked: {}", detail);
    ApiError::internal_server_error().into_response()
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

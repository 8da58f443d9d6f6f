//! HTTP router assembly.
//!
//! Routes, fallbacks and the middleware stack live here so the binary and
//! the integration tests build exactly the same application.

use std::any::Any;

use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::{
    error::failure_body,
    handlers,
    middleware::worker_pool::WorkerPool,
    state::AppState,
};

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/api/payment/process",
            post(handlers::payments::process_payment)
                .fallback(handlers::payments::method_not_allowed),
        )
        .route(
            "/api/payment/verify",
            post(handlers::payments::verify_payment)
                .fallback(handlers::payments::method_not_allowed),
        )
        .route("/health", get(handlers::health::health_check))
        // Everything else is a static asset
        .fallback(handlers::static_files::serve_static);

    let pool = WorkerPool::new(state.config.worker_pool_size);
    with_layers(routes, pool).with_state(state)
}

/// Wrap `routes` in the middleware stack.
///
/// Outermost first: request tracing, the worker pool, `Connection: close`
/// on every response, and panic recovery around the handlers.
pub fn with_layers<S>(routes: Router<S>, pool: WorkerPool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONNECTION,
            HeaderValue::from_static("close"),
        ))
        .layer(pool.layer())
        .layer(TraceLayer::new_for_http())
}

/// Turn a handler panic into the standard 500 failure body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        failure_body("An internal error occurred"),
    )
        .into_response()
}

//! HTTP CRUD service for todo items stored in SQLite.
//!
//! # Overview
//! `app` wires the `/todos` handlers to a `Store`, adds CORS and request
//! tracing, and serves a static frontend for every other path. `run` drives
//! that router on an already-bound listener until `shutdown` resolves.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod store;

use std::future::Future;

use axum::{
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub use config::{AllowedOrigin, Config, ConfigError};
pub use error::AppError;
pub use model::{Todo, TodoInput, ValidationError};
pub use store::{Store, StoreError};

use handlers::{create_todo, delete_todo, get_todo, list_todos, update_todo};

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

fn cors_layer(origin: &AllowedOrigin) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE]);
    match origin {
        AllowedOrigin::Any => cors.allow_origin(Any),
        AllowedOrigin::Exact(origin) => cors.allow_origin(AllowOrigin::list([origin.clone()])),
    }
}

pub fn app(store: Store, config: &Config) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .fallback_service(ServeDir::new(&config.static_dir))
        .with_state(store)
        // CorsLayer only sets these two on preflight responses.
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ))
        .layer(cors_layer(&config.cors_origin))
        .layer(TraceLayer::new_for_http())
}

pub async fn run<F>(
    listener: TcpListener,
    store: Store,
    config: &Config,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(store, config))
        .with_graceful_shutdown(shutdown)
        .await
}

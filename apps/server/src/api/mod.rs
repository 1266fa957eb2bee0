pub mod auth;
pub mod portfolios;
pub mod stocks;
pub mod trading;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{auth::require_jwt, config::Config, state::AppState};

fn cors_layer(allow: &[String]) -> CorsLayer {
    if allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allow.iter().map(|o| o.parse().unwrap()).collect();
    CorsLayer::new().allow_origin(origins)
}

/// Assembles the full `/api/v1` surface. Everything except the health
/// probes and the register/login pair sits behind [`require_jwt`].
pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let public = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(|| async { "ready" }))
        .merge(auth::public_router());

    let protected = Router::new()
        .merge(auth::router())
        .merge(portfolios::router())
        .merge(stocks::router())
        .merge(trading::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_jwt));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .with_state(state)
        .layer(cors_layer(&config.cors_allow))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}

mod route;

pub use route::*;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub fn router(state: Arc<AppState>, cors_origin: Option<&str>) -> Result<Router> {
    let allow_origin = match cors_origin {
        Some(origin) => AllowOrigin::exact(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("CORS_ORIGIN {origin} is not a valid origin"))?,
        ),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .route("/api/route/", post(plan_route))
        .route("/api/route", post(plan_route))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

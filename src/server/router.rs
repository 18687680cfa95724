use axum::{
    Router,
    http::header::{ACCEPT, CONTENT_TYPE, HeaderValue},
    http::{Method, Request},
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::server::handlers;
use crate::server::state::AppState;
use crate::settings::Settings;

pub fn router(state: AppState) -> Router {
    let cors = build_cors_layer(state.settings());

    let api = Router::new()
        .route("/courses", post(handlers::courses))
        .route("/course/:course_id/assignments", post(handlers::assignments))
        .route("/course/:course_id/groups", post(handlers::groups))
        .route("/calculate-grade", post(handlers::calculate_grade));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api", api)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

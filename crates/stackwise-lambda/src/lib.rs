//! stackwise-lambda
//!
//! HTTP API for the recommendation engine. The router lives here so it can
//! be driven in-process; `main.rs` runs it under Lambda.

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/recommendations/supplements",
            get(routes::recommendations::next_suggestion),
        )
        .route(
            "/recommendations/list",
            get(routes::recommendations::list_recommendations),
        )
        .route(
            "/recommendations/{user_reco_id}/refresh",
            post(routes::recommendations::refresh_suggestion),
        )
        .route("/stack/add", post(routes::stack::add_to_stack))
        .route("/stack/get", get(routes::stack::get_stack))
        .route("/stack/remove", post(routes::stack::remove_from_stack))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}

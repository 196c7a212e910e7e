// Library exports for dummydash
// This allows integration tests and the binary to share one router

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod resources;
pub mod routes;
pub mod state;
pub mod sync;
pub mod views;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .route("/assets/{*path}", get(routes::assets::serve))
        .merge(routes::products::router())
        .merge(routes::recipes::router())
        .merge(routes::todos::router())
        .merge(routes::posts::router())
        .merge(routes::comments::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

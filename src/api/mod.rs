mod handlers;
mod rate_limit;
pub mod response;
pub mod state;

pub use state::AppState;

use axum::Router;
use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/address/{addr}/balance", get(handlers::eth_balance))
        .route("/address/{addr}/tokens", get(handlers::token_balance))
        .route("/transaction/{txhash}", get(handlers::transaction_detail))
        .route("/block/{blocknum}", get(handlers::block_info))
        .route("/scan", get(handlers::start_scan))
        .route("/scan/status", get(handlers::scan_status))
        .route("/scan/stop", post(handlers::stop_scan))
        .route("/transactions", get(handlers::list_transactions))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .nest("/api/v1", v1_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

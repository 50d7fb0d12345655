pub mod rides;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::{error::AppError, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(rides::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

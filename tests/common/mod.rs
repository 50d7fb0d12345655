use std::sync::Arc;

use axum::{body::Body, http::Response};
use cycletrack::{
    services::{
        ride_store::{CorruptStorePolicy, RideStore},
        storage::MemoryStorage,
    },
    state::AppState,
};

/// Create a test app backed by in-memory storage.
/// Returns the router, the shared state and the storage handle.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, AppState, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = RideStore::hydrate(Arc::new(storage.clone()), CorruptStorePolicy::Fail)
        .await
        .expect("hydrate empty store");
    let state = AppState::new(store);
    (cycletrack::routes::create_router(state.clone()), state, storage)
}

#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

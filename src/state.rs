use std::sync::Arc;

use crate::services::ride_store::RideStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RideStore>,
}

impl AppState {
    pub fn new(store: RideStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    models::{
        ride::{decode_rides, encode_rides, RideRecord},
        ride_form::RideDraft,
        stats::RideStats,
    },
    services::storage::RideStorage,
};

/// What to do when the stored document cannot be decoded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptStorePolicy {
    /// Refuse to start.
    #[default]
    Fail,
    /// Log and start with an empty collection. The old entry is overwritten
    /// on the next change.
    Reset,
}

struct Inner {
    rides: Vec<RideRecord>,
    last_id: i64,
}

/// Owns the ride collection (newest first) and mirrors it into storage after
/// every change.
pub struct RideStore {
    inner: Mutex<Inner>,
    storage: Arc<dyn RideStorage>,
}

impl RideStore {
    pub async fn hydrate(
        storage: Arc<dyn RideStorage>,
        policy: CorruptStorePolicy,
    ) -> Result<Self, AppError> {
        let rides = match storage.load().await? {
            None => Vec::new(),
            Some(raw) => match decode_rides(&raw) {
                Ok(rides) => rides,
                Err(err) if err.is_corrupt_store() && policy == CorruptStorePolicy::Reset => {
                    warn!("stored rides could not be read, starting empty: {err}");
                    Vec::new()
                }
                Err(err) => return Err(err),
            },
        };
        info!("hydrated {} rides", rides.len());

        let last_id = rides.iter().map(|r| r.id).max().unwrap_or(0);
        Ok(Self {
            inner: Mutex::new(Inner { rides, last_id }),
            storage,
        })
    }

    /// Prepends `ride` and persists the collection.
    pub async fn add(&self, ride: RideRecord) -> Result<RideRecord, AppError> {
        let mut inner = self.inner.lock().await;
        self.prepend(&mut inner, ride).await
    }

    /// Finalizes `draft` with a fresh id and adds it. A rejected draft leaves
    /// the collection untouched.
    pub async fn submit(&self, draft: RideDraft) -> Result<RideRecord, AppError> {
        let mut inner = self.inner.lock().await;
        let id = next_id(inner.last_id, Utc::now().timestamp_millis());
        let ride = draft.finalize(id).map_err(|err| {
            debug!("ride draft rejected: {err}");
            err
        })?;
        self.prepend(&mut inner, ride).await
    }

    /// Removes the ride with `id`. Returns false, without touching storage,
    /// when no such ride exists.
    pub async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().await;
        let Some(pos) = inner.rides.iter().position(|r| r.id == id) else {
            debug!(id, "remove for unknown ride ignored");
            return Ok(false);
        };
        let removed = inner.rides.remove(pos);
        if let Err(err) = self.persist(&inner.rides).await {
            inner.rides.insert(pos, removed);
            return Err(err);
        }
        info!(id, "ride removed");
        Ok(true)
    }

    pub async fn rides(&self) -> Vec<RideRecord> {
        self.inner.lock().await.rides.clone()
    }

    pub async fn stats(&self) -> RideStats {
        RideStats::from_rides(&self.inner.lock().await.rides)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rides.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn prepend(&self, inner: &mut Inner, ride: RideRecord) -> Result<RideRecord, AppError> {
        inner.rides.insert(0, ride.clone());
        if let Err(err) = self.persist(&inner.rides).await {
            inner.rides.remove(0);
            return Err(err);
        }
        inner.last_id = inner.last_id.max(ride.id);
        info!(id = ride.id, date = %ride.date, distance = ride.distance, "ride added");
        Ok(ride)
    }

    async fn persist(&self, rides: &[RideRecord]) -> Result<(), AppError> {
        let raw = encode_rides(rides)?;
        self.storage.save(&raw).await
    }
}

// Wall-clock milliseconds, bumped past the last id handed out.
fn next_id(last_id: i64, now_ms: i64) -> i64 {
    now_ms.max(last_id + 1)
}

//! Aggregates shown on the dashboard tiles.
//!
//! Computed from the live collection on every render and never persisted.

use serde::Serialize;

use crate::models::ride::RideRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RideStats {
    pub ride_count: usize,
    /// Kilometers.
    pub total_distance: f64,
    /// Minutes.
    pub total_duration: u64,
    /// Total distance over total time, not the mean of per-ride speeds.
    pub average_speed: f64,
}

impl RideStats {
    pub fn from_rides(rides: &[RideRecord]) -> Self {
        let total_distance: f64 = rides.iter().map(|r| r.distance).sum();
        let total_duration: u64 = rides.iter().map(|r| u64::from(r.duration)).sum();
        let average_speed = if total_duration > 0 {
            total_distance / (total_duration as f64 / 60.0)
        } else {
            0.0
        };

        Self {
            ride_count: rides.len(),
            total_distance,
            total_duration,
            average_speed,
        }
    }

    pub fn total_distance_text(&self) -> String {
        format!("{:.1}", self.total_distance)
    }

    pub fn total_time_text(&self) -> String {
        format!("{}h {}m", self.total_duration / 60, self.total_duration % 60)
    }

    pub fn average_speed_text(&self) -> String {
        format!("{:.1}", self.average_speed)
    }
}

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::models::ride::{derived_speed, RideRecord};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RideFormError {
    #[error("{0} is required")]
    MissingRequiredField(&'static str),
    #[error("{field} must be a positive number, got \"{value}\"")]
    InvalidNumber { field: &'static str, value: String },
    #[error("date must look like YYYY-MM-DD, got \"{0}\"")]
    InvalidDate(String),
    #[error("duration must be at least one minute")]
    ZeroDuration,
}

/// Raw form input for a ride that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RideDraft {
    pub date: String,
    pub distance: String,
    pub duration: String,
    pub avg_speed: String,
    pub location: String,
}

impl RideDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    /// Validates the draft and turns it into a ride carrying `id`.
    pub fn finalize(self, id: i64) -> Result<RideRecord, RideFormError> {
        let distance = required(&self.distance, "distance")?;
        let duration = required(&self.duration, "duration")?;
        let date = required(&self.date, "date")?;

        let distance = parse_distance(distance)?;
        let duration = parse_minutes(duration)?;
        if duration == 0 {
            return Err(RideFormError::ZeroDuration);
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| RideFormError::InvalidDate(date.to_string()))?;

        let avg_speed = match self.avg_speed.trim() {
            "" => derived_speed(distance, duration),
            raw => parse_speed(raw)?,
        };

        Ok(RideRecord {
            id,
            date,
            distance,
            duration,
            avg_speed,
            location: self.location.trim().to_string(),
        })
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, RideFormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RideFormError::MissingRequiredField(field))
    } else {
        Ok(trimmed)
    }
}

fn invalid(field: &'static str, value: &str) -> RideFormError {
    RideFormError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}

fn parse_distance(raw: &str) -> Result<f64, RideFormError> {
    match raw.parse::<f64>() {
        Ok(km) if km.is_finite() && km > 0.0 => Ok(km),
        _ => Err(invalid("distance", raw)),
    }
}

// Fractional minutes are truncated toward zero.
fn parse_minutes(raw: &str) -> Result<u32, RideFormError> {
    if let Ok(minutes) = raw.parse::<u32>() {
        return Ok(minutes);
    }
    match raw.parse::<f64>() {
        Ok(minutes) if minutes.is_finite() && minutes >= 0.0 && minutes < f64::from(u32::MAX) => {
            Ok(minutes.trunc() as u32)
        }
        _ => Err(invalid("duration", raw)),
    }
}

fn parse_speed(raw: &str) -> Result<f64, RideFormError> {
    match raw.parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed >= 0.0 => Ok(speed),
        _ => Err(invalid("average speed", raw)),
    }
}

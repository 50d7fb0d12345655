use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::error::AppError;

/// Version written into every persisted rides document.
pub const STORE_VERSION: u64 = 1;

/// One logged ride.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRecord {
    pub id: i64,
    pub date: NaiveDate,
    /// Kilometers.
    pub distance: f64,
    /// Minutes.
    pub duration: u32,
    /// km/h. Older documents store this as a numeric string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub avg_speed: f64,
    #[serde(default)]
    pub location: String,
}

impl RideRecord {
    pub fn has_location(&self) -> bool {
        !self.location.is_empty()
    }

    pub fn date_text(&self) -> String {
        self.date.format("%b %-d, %Y").to_string()
    }

    pub fn distance_text(&self) -> String {
        format!("{} km", self.distance)
    }

    pub fn duration_text(&self) -> String {
        format!("{} min", self.duration)
    }

    /// Shows the stored speed as-is. Derived speeds are already rounded.
    pub fn avg_speed_text(&self) -> String {
        format!("{} km/h", self.avg_speed)
    }

    // Older documents hold "Infinity" or "NaN" for rides logged with zero
    // minutes. JSON cannot carry those back, so they are recomputed.
    fn repair_speed(&mut self) {
        if !self.avg_speed.is_finite() {
            self.avg_speed = derived_speed(self.distance, self.duration);
        }
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// km/h from kilometers and minutes, rounded to one decimal. Zero minutes
/// gives 0.
pub fn derived_speed(distance: f64, duration: u32) -> f64 {
    if duration == 0 {
        return 0.0;
    }
    let speed = round1(distance / (f64::from(duration) / 60.0));
    if speed.is_finite() {
        speed
    } else {
        0.0
    }
}

#[derive(Serialize)]
struct StoredRides<'a> {
    version: u64,
    rides: &'a [RideRecord],
}

pub fn encode_rides(rides: &[RideRecord]) -> Result<String, AppError> {
    if let Some(bad) = rides
        .iter()
        .find(|r| !r.distance.is_finite() || !r.avg_speed.is_finite())
    {
        return Err(AppError::MalformedStore(format!(
            "ride {} has a non-finite distance or speed",
            bad.id
        )));
    }
    let doc = StoredRides {
        version: STORE_VERSION,
        rides,
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decodes a rides document. Accepts the versioned envelope as well as the
/// bare array written before documents carried a version.
pub fn decode_rides(raw: &str) -> Result<Vec<RideRecord>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(raw)?;
    let mut rides: Vec<RideRecord> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(mut doc) => {
            let version = doc.get("version").and_then(Value::as_u64).unwrap_or(0);
            if version != STORE_VERSION {
                return Err(AppError::UnsupportedStoreVersion(version));
            }
            let rides = doc.remove("rides").unwrap_or(Value::Array(Vec::new()));
            serde_json::from_value(rides)?
        }
        _ => {
            return Err(AppError::MalformedStore(
                "expected a rides array or a versioned document".into(),
            ))
        }
    };
    for ride in &mut rides {
        ride.repair_speed();
    }
    Ok(rides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride(id: i64, distance: f64, duration: u32, location: &str) -> RideRecord {
        RideRecord {
            id,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            distance,
            duration,
            avg_speed: round1(distance / (duration as f64 / 60.0)),
            location: location.to_string(),
        }
    }

    #[test]
    fn test_encode_then_decode_preserves_order_and_fields() {
        let rides = vec![ride(2, 30.0, 90, ""), ride(1, 10.5, 30, "Park")];

        let raw = encode_rides(&rides).unwrap();
        let decoded = decode_rides(&raw).unwrap();

        assert_eq!(decoded, rides);
    }

    #[test]
    fn test_encoded_document_uses_camel_case_and_version() {
        let raw = encode_rides(&[ride(7, 15.0, 45, "Park")]).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["version"], 1);
        let first = &value["rides"][0];
        assert_eq!(first["id"], 7);
        assert_eq!(first["date"], "2024-01-01");
        assert_eq!(first["avgSpeed"], 20.0);
        assert_eq!(first["location"], "Park");
    }

    #[test]
    fn test_decode_legacy_array_with_string_speed() {
        let raw = r#"[
            {"id":1704067200000,"date":"2024-01-01","distance":15,"duration":45,"avgSpeed":"20.0","location":"Park"},
            {"id":1704067100000,"date":"2023-12-31","distance":12.5,"duration":30,"avgSpeed":25}
        ]"#;

        let rides = decode_rides(raw).unwrap();

        assert_eq!(rides.len(), 2);
        assert_eq!(rides[0].avg_speed, 20.0);
        assert_eq!(rides[0].location, "Park");
        assert_eq!(rides[1].avg_speed, 25.0);
        assert!(!rides[1].has_location());
    }

    #[test]
    fn test_decode_empty_input_is_empty_collection() {
        assert!(decode_rides("").unwrap().is_empty());
        assert!(decode_rides("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = decode_rides(r#"{"version":9,"rides":[]}"#).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedStoreVersion(9)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_rides("{not json"), Err(AppError::Json(_))));
        assert!(matches!(
            decode_rides("42"),
            Err(AppError::MalformedStore(_))
        ));
    }

    #[test]
    fn test_display_helpers() {
        let r = ride(1, 15.0, 45, "Park");
        assert_eq!(r.date_text(), "Jan 1, 2024");
        assert_eq!(r.distance_text(), "15 km");
        assert_eq!(r.duration_text(), "45 min");
        assert_eq!(r.avg_speed_text(), "20 km/h");

        let entered = RideRecord {
            avg_speed: 31.25,
            ..r
        };
        assert_eq!(entered.avg_speed_text(), "31.25 km/h");
    }

    #[test]
    fn test_decode_replaces_non_finite_legacy_speeds() {
        let raw = r#"[
            {"id":3,"date":"2024-01-03","distance":12,"duration":0,"avgSpeed":"Infinity","location":""},
            {"id":2,"date":"2024-01-02","distance":0,"duration":0,"avgSpeed":"NaN","location":""},
            {"id":1,"date":"2024-01-01","distance":10,"duration":30,"avgSpeed":"Infinity","location":""}
        ]"#;

        let rides = decode_rides(raw).unwrap();

        assert_eq!(rides[0].avg_speed, 0.0);
        assert_eq!(rides[1].avg_speed, 0.0);
        assert_eq!(rides[2].avg_speed, 20.0);

        let reencoded = encode_rides(&rides).unwrap();
        assert!(!reencoded.contains("null"));
        assert_eq!(decode_rides(&reencoded).unwrap(), rides);
    }

    #[test]
    fn test_encode_refuses_non_finite_values() {
        let mut bad = ride(5, 10.0, 30, "");
        bad.avg_speed = f64::INFINITY;

        let err = encode_rides(&[bad]).unwrap_err();

        assert!(matches!(err, AppError::MalformedStore(_)));
    }

    #[test]
    fn test_derived_speed() {
        assert_eq!(derived_speed(15.0, 45), 20.0);
        assert_eq!(derived_speed(10.0, 35), 17.1);
        assert_eq!(derived_speed(12.0, 0), 0.0);
    }
}

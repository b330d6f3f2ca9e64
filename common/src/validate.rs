//! Creation payload checks shared by the backend and the web client.
//!
//! Every rule is evaluated and all failures are reported together, so a
//! single round trip tells the user everything that is wrong with a form.

use std::ops::RangeInclusive;

use serde_json::Value;

use crate::req::{NewDevice, RawDevice};

pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
pub const SIGNAL_RANGE: RangeInclusive<f64> = 0.0..=10.0;

pub const INVALID_BODY: &str = "Invalid or missing request body";
pub const INVALID_SIGNAL: &str = "Signal quality must be a number between 0 and 10";

/// Checks `raw` and coerces it into a [`NewDevice`].
///
/// The label is kept as sent (no trimming, no escaping). Coordinates become
/// `f64`, the signal quality is truncated to an integer.
pub fn validate(raw: &RawDevice) -> Result<NewDevice, Vec<String>> {
    let mut errors = Vec::new();

    // presence
    let device_id = required("device_id", &raw.device_id, &mut errors);
    let coordinate_x = required("coordinate_x", &raw.coordinate_x, &mut errors);
    let coordinate_y = required("coordinate_y", &raw.coordinate_y, &mut errors);
    let signal_quality = required("signal_quality", &raw.signal_quality, &mut errors);

    // format and range, only for fields that are there
    let coordinate_x = coordinate_x
        .and_then(|text| coordinate(&text, "Coordinate_x", &LONGITUDE_RANGE, &mut errors));
    let coordinate_y = coordinate_y
        .and_then(|text| coordinate(&text, "Coordinate_y", &LATITUDE_RANGE, &mut errors));
    let signal_quality = signal_quality.and_then(|text| match number(&text) {
        Some(v) if SIGNAL_RANGE.contains(&v) => Some(v as i32),
        _ => {
            errors.push(INVALID_SIGNAL.to_owned());
            None
        }
    });

    match (device_id, coordinate_x, coordinate_y, signal_quality) {
        (Some(device_id), Some(coordinate_x), Some(coordinate_y), Some(signal_quality)) => {
            Ok(NewDevice {
                device_id,
                coordinate_x,
                coordinate_y,
                signal_quality,
            })
        }
        _ => Err(errors),
    }
}

fn required(name: &str, value: &Option<Value>, errors: &mut Vec<String>) -> Option<String> {
    let text = value.as_ref().and_then(as_text);
    match text {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            errors.push(format!("Missing or empty {name}"));
            None
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn coordinate(
    text: &str,
    label: &str,
    range: &RangeInclusive<f64>,
    errors: &mut Vec<String>,
) -> Option<f64> {
    let Some(value) = number(text) else {
        errors.push(format!("{label} must be a number"));
        return None;
    };
    if !range.contains(&value) {
        errors.push(format!(
            "{label} must be between {} and {}",
            range.start(),
            range.end()
        ));
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawDevice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_valid_json_payload() {
        let dev = validate(&raw(json!({
            "device_id": "sensor-1",
            "coordinate_x": 37.618423,
            "coordinate_y": 55.751244,
            "signal_quality": 7
        })))
        .unwrap();

        assert_eq!(dev.device_id, "sensor-1");
        assert_eq!(dev.coordinate_x, 37.618423);
        assert_eq!(dev.coordinate_y, 55.751244);
        assert_eq!(dev.signal_quality, 7);
    }

    #[test]
    fn accepts_string_values() {
        let dev = validate(&RawDevice::from_text(" tower ", "-0.5", "51.5", "10")).unwrap();
        assert_eq!(dev.device_id, " tower ");
        assert_eq!(dev.coordinate_x, -0.5);
        assert_eq!(dev.signal_quality, 10);
    }

    #[test]
    fn truncates_fractional_signal() {
        let dev = validate(&RawDevice::from_text("a", "1", "1", "7.9")).unwrap();
        assert_eq!(dev.signal_quality, 7);
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = validate(&RawDevice::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Missing or empty device_id",
                "Missing or empty coordinate_x",
                "Missing or empty coordinate_y",
                "Missing or empty signal_quality",
            ]
        );
    }

    #[test]
    fn blank_and_null_count_as_missing() {
        let errors = validate(&raw(json!({
            "device_id": "   ",
            "coordinate_x": null,
            "coordinate_y": 1,
            "signal_quality": 1
        })))
        .unwrap_err();
        assert_eq!(
            errors,
            vec!["Missing or empty device_id", "Missing or empty coordinate_x"]
        );
    }

    #[test]
    fn accumulates_format_and_range_failures() {
        let errors = validate(&RawDevice::from_text("a", "east", "91", "11")).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Coordinate_x must be a number",
                "Coordinate_y must be between -90 and 90",
                INVALID_SIGNAL,
            ]
        );
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let errors = validate(&RawDevice::from_text("a", "inf", "NaN", "5")).unwrap_err();
        assert_eq!(
            errors,
            vec!["Coordinate_x must be a number", "Coordinate_y must be a number"]
        );
    }

    #[test]
    fn signal_bounds_are_inclusive() {
        assert!(validate(&RawDevice::from_text("a", "0", "0", "0")).is_ok());
        assert!(validate(&RawDevice::from_text("a", "0", "0", "10")).is_ok());
        assert_eq!(
            validate(&RawDevice::from_text("a", "0", "0", "-1")).unwrap_err(),
            vec![INVALID_SIGNAL]
        );
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        assert!(validate(&RawDevice::from_text("a", "180", "-90", "1")).is_ok());
        assert_eq!(
            validate(&RawDevice::from_text("a", "-180.1", "0", "1")).unwrap_err(),
            vec!["Coordinate_x must be between -180 and 180"]
        );
    }
}

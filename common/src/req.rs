// keep in sync with schema.rs of backend
use serde_json::Value;

/// A located device as stored by the backend.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Device {
    pub id: i32,
    pub device_id: String,
    pub coordinate_x: f64,  // longitude
    pub coordinate_y: f64,  // latitude
    pub signal_quality: i32, // 0..=10
}

/// Validated creation payload.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewDevice {
    pub device_id: String,
    pub coordinate_x: f64,
    pub coordinate_y: f64,
    pub signal_quality: i32,
}

/// Creation payload as it arrives over the wire: any JSON value or form string
/// per field, nothing checked yet.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RawDevice {
    #[serde(default)]
    pub device_id: Option<Value>,
    #[serde(default)]
    pub coordinate_x: Option<Value>,
    #[serde(default)]
    pub coordinate_y: Option<Value>,
    #[serde(default)]
    pub signal_quality: Option<Value>,
}

impl RawDevice {
    /// Builds a payload from plain text fields, e.g. the values of an html form.
    pub fn from_text(
        device_id: &str,
        coordinate_x: &str,
        coordinate_y: &str,
        signal_quality: &str,
    ) -> Self {
        let text = |s: &str| Some(Value::String(s.to_owned()));
        Self {
            device_id: text(device_id),
            coordinate_x: text(coordinate_x),
            coordinate_y: text(coordinate_y),
            signal_quality: text(signal_quality),
        }
    }
}

/// Body of a 400 response.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ErrorList {
    pub errors: Vec<String>,
}

/// Body of a 404/500 response.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ErrorMessage {
    pub error: String,
}

/// Alternative acknowledgement shape for a successful create. The backend
/// answers with the full [`Device`]; clients accept either.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Created {
    pub id: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum CreateResponse {
    Device(Device),
    Created(Created),
}

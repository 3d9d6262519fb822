use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NITROGEN: &str = "N";
pub const PHOSPHORUS: &str = "P";
pub const POTASSIUM: &str = "K";
pub const PH: &str = "pH";
pub const MOISTURE: &str = "Moisture";
pub const HUMIDITY: &str = "Humidity";
pub const RAINFALL: &str = "Rainfall";
pub const SOIL_TYPE: &str = "Soil Type";
pub const CROP_TYPE: &str = "Crop Type";

/// Key under which the gateway tags where a payload came from.
pub const SOURCE_KEY: &str = "source";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single measured parameter as the gateway sent it.
///
/// The gateway is free to send numbers or numeric strings; anything else is
/// kept verbatim so it can be forwarded, but never counts as a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl ParamValue {
    /// Numeric view of the value. Unparseable and non-finite values yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            ParamValue::Number(n) => *n,
            ParamValue::Text(text) => text.trim().parse::<f64>().ok()?,
            ParamValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Text form used when the value is transmitted as a form field.
    pub fn to_form_value(&self) -> String {
        match self {
            ParamValue::Number(n) => n.to_string(),
            ParamValue::Text(text) => text.clone(),
            ParamValue::Other(value) => value.to_string(),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Mock,
    #[default]
    #[serde(other)]
    Real,
}

/// One snapshot of soil measurements plus where it came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub source: Provenance,
    #[serde(flatten)]
    pub values: BTreeMap<String, ParamValue>,
}

impl SensorReading {
    pub fn new(source: Provenance) -> Self {
        Self {
            source,
            values: BTreeMap::new(),
        }
    }

    pub fn real() -> Self {
        Self::new(Provenance::Real)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ParamValue::as_f64)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_mock(&self) -> bool {
        self.source == Provenance::Mock
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop: String,
    pub fertilizer: String,
    pub amount: String,
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ParamValue, Provenance, Recommendation, SensorReading, SOURCE_KEY};

/// Body of `GET {base}/test_sensor`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Provenance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, ParamValue>>,
}

impl GatewayResponse {
    /// Message of an explicit `success: false` reply.
    pub fn reported_failure(&self) -> Option<String> {
        if self.success != Some(false) {
            return None;
        }
        Some(
            self.error
                .clone()
                .unwrap_or_else(|| "API reported failure".to_string()),
        )
    }

    /// Converts the payload into a reading. A `source` tag embedded in `data`
    /// is lifted out of the values and treated as provenance.
    pub fn into_reading(self) -> SensorReading {
        let mut values = self.data.unwrap_or_default();
        let embedded_mock = matches!(
            values.remove(SOURCE_KEY),
            Some(ParamValue::Text(tag)) if tag == "mock"
        );
        let source = if embedded_mock || self.source == Some(Provenance::Mock) {
            Provenance::Mock
        } else {
            Provenance::Real
        };
        SensorReading { source, values }
    }
}

/// The two accepted success shapes of `POST {base}/predict`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PredictionPayload {
    Wrapped { results: Recommendation },
    Bare(Recommendation),
}

impl PredictionPayload {
    pub fn into_recommendation(self) -> Recommendation {
        match self {
            PredictionPayload::Wrapped { results } => results,
            PredictionPayload::Bare(recommendation) => recommendation,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReplyStatus {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionReply {
    Recommendation(Recommendation),
    /// The service answered but reported that prediction failed.
    Failed(String),
}

impl PredictionReply {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let status = ReplyStatus::deserialize(value).unwrap_or_default();
        if status.success == Some(false) {
            return Ok(PredictionReply::Failed(
                status
                    .error
                    .unwrap_or_else(|| "prediction service reported failure".to_string()),
            ));
        }
        let payload = PredictionPayload::deserialize(value)?;
        Ok(PredictionReply::Recommendation(payload.into_recommendation()))
    }
}

/// Body of `GET {base}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialPortInfo {
    pub port: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `GET {base}/list_ports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortListResponse {
    pub success: bool,
    #[serde(default)]
    pub ports: Vec<SerialPortInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

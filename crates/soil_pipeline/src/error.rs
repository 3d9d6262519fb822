use shared::error::{ErrorKind, FailureReport};
use thiserror::Error;

use crate::validator::describe_invalid;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("{message}")]
    Network {
        message: String,
        status: Option<u16>,
        body: Option<serde_json::Value>,
    },
    #[error("{0}")]
    Upstream(String),
    #[error("No physical sensor connected. Cannot read real data.")]
    MockData,
    #[error("Sensor readings too low ({}) - not inserted in soil", .params.join(", "))]
    Insertion { params: Vec<String> },
    #[error("{}", describe_invalid(.params))]
    Validation { params: Vec<String> },
    #[error("Invalid response format: {0}")]
    MalformedResponse(String),
}

impl PipelineError {
    pub fn network(message: impl Into<String>) -> Self {
        PipelineError::Network {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Network { .. } => ErrorKind::Network,
            PipelineError::Upstream(_) => ErrorKind::Upstream,
            PipelineError::MockData => ErrorKind::MockData,
            PipelineError::Insertion { .. } => ErrorKind::Insertion,
            PipelineError::Validation { .. } => ErrorKind::Validation,
            PipelineError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Network { message, .. } => classify_transport_failure(message),
            PipelineError::MockData => {
                "Please connect your soil sensor device and try again.".to_string()
            }
            PipelineError::Insertion { .. } => {
                "Sensor detected but readings are too low. Please insert sensor into soil."
                    .to_string()
            }
            PipelineError::Upstream(_)
            | PipelineError::Validation { .. }
            | PipelineError::MalformedResponse(_) => self.to_string(),
        }
    }

    pub fn report(&self) -> FailureReport {
        let mut report = FailureReport::new(self.kind(), self.user_message());
        if let PipelineError::Network { status, body, .. } = self {
            report.status = *status;
            report.body = body.clone();
        }
        report
    }
}

fn classify_transport_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        format!("Service did not answer in time; check the device and retry. ({message})")
    } else if lower.contains("connection refused")
        || lower.contains("failed to connect")
        || lower.contains("error sending request")
        || lower.contains("dns")
    {
        format!("Service unreachable; check URL/network and retry. ({message})")
    } else {
        message.to_string()
    }
}

use serde::Serialize;
use shared::{
    domain::{OperationId, Recommendation, SensorReading},
    error::FailureReport,
};

use crate::{error::PipelineError, state::PipelineState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Acquisition,
    Submission,
}

/// Terminal signal presentation turns into haptic or audible feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Success,
    Error,
}

impl Feedback {
    pub fn for_outcome<T>(outcome: &Result<T, PipelineError>) -> Self {
        if outcome.is_ok() {
            Feedback::Success
        } else {
            Feedback::Error
        }
    }
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    ReadingAcquired {
        operation_id: OperationId,
        reading: SensorReading,
    },
    RecommendationReady {
        operation_id: OperationId,
        recommendation: Recommendation,
    },
    Failed {
        operation_id: OperationId,
        operation: Operation,
        report: FailureReport,
    },
}

impl PipelineEvent {
    /// Feedback for terminal events; `None` for plain state changes.
    pub fn feedback(&self) -> Option<Feedback> {
        match self {
            PipelineEvent::StateChanged(_) => None,
            PipelineEvent::ReadingAcquired { .. } | PipelineEvent::RecommendationReady { .. } => {
                Some(Feedback::Success)
            }
            PipelineEvent::Failed { .. } => Some(Feedback::Error),
        }
    }
}

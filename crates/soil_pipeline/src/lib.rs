//! Acquire → validate → submit → classify pipeline for soil sensor readings.

use std::sync::Arc;

use anyhow::Result;
use shared::domain::SensorReading;
use tokio::sync::broadcast;

pub mod acquisition;
pub mod config;
pub mod error;
pub mod events;
pub mod inputs;
pub mod state;
pub mod submission;
pub mod transport;
pub mod validator;

pub use acquisition::{AcquisitionController, AcquisitionResult};
pub use config::{load_settings, PipelineSettings};
pub use error::PipelineError;
pub use events::{Feedback, Operation, PipelineEvent};
pub use inputs::{CropInputs, SubmissionDefaults, SubmissionExtras};
pub use state::{PipelineState, PipelineStore};
pub use submission::{SubmissionController, SubmissionResult};
pub use transport::{HttpCollaborators, PredictionService, SensorGateway};
pub use validator::{classify_before_submit, classify_reading, ReadingClass, SubmitCheck};

/// One independent pipeline: both controllers bound to a shared state store.
pub struct SoilPipeline {
    state: Arc<PipelineStore>,
    acquisition: AcquisitionController,
    submission: SubmissionController,
}

impl SoilPipeline {
    /// Pipeline talking to the HTTP collaborators described by `settings`.
    pub fn from_settings(settings: &PipelineSettings) -> Result<Self> {
        let base_url = config::normalize_base_url(&settings.base_url)?;
        let http = Arc::new(HttpCollaborators::new(base_url, settings.request_timeout)?);
        Ok(Self::new_with_dependencies(http.clone(), http, settings))
    }

    pub fn new_with_dependencies(
        gateway: Arc<dyn SensorGateway>,
        service: Arc<dyn PredictionService>,
        settings: &PipelineSettings,
    ) -> Self {
        let state = Arc::new(PipelineStore::new());
        Self {
            acquisition: AcquisitionController::new(
                gateway,
                settings.policy.clone(),
                Arc::clone(&state),
            ),
            submission: SubmissionController::new(
                service,
                settings.policy.clone(),
                settings.defaults.clone(),
                Arc::clone(&state),
            ),
            state,
        }
    }

    pub async fn acquire(&self) -> AcquisitionResult {
        self.acquisition.acquire().await
    }

    pub async fn submit(&self, reading: &SensorReading) -> SubmissionResult {
        self.submission.submit(reading).await
    }

    pub async fn submit_with(
        &self,
        reading: &SensorReading,
        extras: &SubmissionExtras,
    ) -> SubmissionResult {
        self.submission.submit_with(reading, extras).await
    }

    /// Submits the reading currently held in state. With nothing held, the
    /// submission fails validation on every required parameter.
    pub async fn submit_current(&self, extras: &SubmissionExtras) -> SubmissionResult {
        let reading = self.state.snapshot().reading.unwrap_or_default();
        self.submission.submit_with(&reading, extras).await
    }

    pub fn snapshot(&self) -> PipelineState {
        self.state.snapshot()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PipelineEvent> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;

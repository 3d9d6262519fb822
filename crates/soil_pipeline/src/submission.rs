use std::sync::Arc;

use shared::{
    domain::{OperationId, Recommendation, SensorReading},
    protocol::PredictionReply,
};
use tracing::{debug, info, warn};

use crate::{
    error::PipelineError,
    events::Operation,
    inputs::{CropInputs, SubmissionDefaults, SubmissionExtras},
    state::PipelineStore,
    transport::PredictionService,
    validator::{SubmitCheck, ValidationPolicy},
};

pub type SubmissionResult = Result<Recommendation, PipelineError>;

pub struct SubmissionController {
    service: Arc<dyn PredictionService>,
    policy: ValidationPolicy,
    defaults: SubmissionDefaults,
    state: Arc<PipelineStore>,
}

impl SubmissionController {
    pub fn new(
        service: Arc<dyn PredictionService>,
        policy: ValidationPolicy,
        defaults: SubmissionDefaults,
        state: Arc<PipelineStore>,
    ) -> Self {
        Self {
            service,
            policy,
            defaults,
            state,
        }
    }

    pub async fn submit(&self, reading: &SensorReading) -> SubmissionResult {
        self.submit_with(reading, &SubmissionExtras::default()).await
    }

    /// Validates `reading`, sends it with `extras` and records the outcome.
    /// Readings that fail validation never reach the service.
    pub async fn submit_with(
        &self,
        reading: &SensorReading,
        extras: &SubmissionExtras,
    ) -> SubmissionResult {
        let operation_id = OperationId::new();
        let guard = self.state.begin(Operation::Submission, operation_id);
        info!(%operation_id, "submission: requesting recommendation");

        let outcome = self.validate_and_predict(reading, extras).await;
        match &outcome {
            Ok(recommendation) => {
                info!(
                    %operation_id,
                    crop = %recommendation.crop,
                    fertilizer = %recommendation.fertilizer,
                    "submission: recommendation received"
                );
                guard.complete_submission(recommendation.clone());
            }
            Err(err) => {
                warn!(
                    %operation_id,
                    kind = ?err.kind(),
                    message = %err,
                    "submission: request failed"
                );
                guard.fail(err);
            }
        }
        outcome
    }

    async fn validate_and_predict(
        &self,
        reading: &SensorReading,
        extras: &SubmissionExtras,
    ) -> SubmissionResult {
        if reading.is_mock() {
            return Err(PipelineError::MockData);
        }
        if let SubmitCheck::Invalid(params) = self.policy.classify_before_submit(reading) {
            return Err(PipelineError::Validation { params });
        }

        let inputs = CropInputs::build(reading, extras, &self.defaults);
        debug!(?inputs, "submission: built crop inputs");

        let reply = self.service.predict_crop(&inputs).await?;
        match PredictionReply::from_value(&reply) {
            Ok(PredictionReply::Recommendation(recommendation)) => Ok(recommendation),
            Ok(PredictionReply::Failed(message)) => Err(PipelineError::Upstream(message)),
            Err(err) => Err(PipelineError::MalformedResponse(format!(
                "prediction service reply matched neither accepted shape: {err}"
            ))),
        }
    }
}

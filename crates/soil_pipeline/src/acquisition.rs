use std::sync::Arc;

use shared::domain::{OperationId, SensorReading};
use tracing::{info, warn};

use crate::{
    error::PipelineError,
    events::Operation,
    state::PipelineStore,
    transport::SensorGateway,
    validator::{ReadingClass, ValidationPolicy},
};

pub type AcquisitionResult = Result<SensorReading, PipelineError>;

pub struct AcquisitionController {
    gateway: Arc<dyn SensorGateway>,
    policy: ValidationPolicy,
    state: Arc<PipelineStore>,
}

impl AcquisitionController {
    pub fn new(
        gateway: Arc<dyn SensorGateway>,
        policy: ValidationPolicy,
        state: Arc<PipelineStore>,
    ) -> Self {
        Self {
            gateway,
            policy,
            state,
        }
    }

    /// Reads the gateway once and records the classified outcome.
    ///
    /// On failure the previously held reading is left untouched; on success
    /// it is replaced and any held recommendation is discarded.
    pub async fn acquire(&self) -> AcquisitionResult {
        let operation_id = OperationId::new();
        let guard = self.state.begin(Operation::Acquisition, operation_id);
        info!(%operation_id, "acquisition: reading sensor gateway");

        let outcome = self.read_and_classify().await;
        match &outcome {
            Ok(reading) => {
                info!(
                    %operation_id,
                    params = reading.values.len(),
                    "acquisition: reading accepted"
                );
                guard.complete_acquisition(reading.clone());
            }
            Err(err) => {
                warn!(
                    %operation_id,
                    kind = ?err.kind(),
                    message = %err,
                    "acquisition: reading rejected"
                );
                guard.fail(err);
            }
        }
        outcome
    }

    async fn read_and_classify(&self) -> AcquisitionResult {
        let response = self.gateway.read_sensor().await?;
        if let Some(message) = response.reported_failure() {
            return Err(PipelineError::Upstream(message));
        }

        let reading = response.into_reading();
        match self.policy.classify_reading(&reading) {
            ReadingClass::Ok => Ok(reading),
            ReadingClass::Mock => Err(PipelineError::MockData),
            ReadingClass::TooLow(params) => Err(PipelineError::Insertion { params }),
        }
    }
}

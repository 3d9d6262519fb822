//! Client-held pipeline state and its change notifications.
//!
//! All writes go through [`PipelineStore`]. Each terminal transition is
//! applied under one lock so observers never see `loading == false` next to a
//! half-written reading, and is published before the controller returns.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{OperationId, Recommendation, SensorReading},
    error::{ErrorKind, FailureReport},
};
use tokio::sync::broadcast;

use crate::{
    error::PipelineError,
    events::{Operation, PipelineEvent},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineState {
    pub loading: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub reading: Option<SensorReading>,
    pub recommendation: Option<Recommendation>,
    pub acquired_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct StoreInner {
    state: PipelineState,
    in_flight: usize,
}

pub struct PipelineStore {
    inner: Mutex<StoreInner>,
    events: broadcast::Sender<PipelineEvent>,
}

impl Default for PipelineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Mutex::new(StoreInner::default()),
            events,
        }
    }

    pub fn snapshot(&self) -> PipelineState {
        self.lock().state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Marks an operation as started. The returned guard must be resolved
    /// with one of its terminal methods; dropping it unresolved records the
    /// operation as interrupted.
    pub fn begin(&self, operation: Operation, operation_id: OperationId) -> OperationGuard<'_> {
        let snapshot = {
            let mut inner = self.lock();
            inner.in_flight += 1;
            inner.state.loading = true;
            inner.state.error = None;
            inner.state.error_kind = None;
            inner.state.clone()
        };
        self.publish([PipelineEvent::StateChanged(snapshot)]);
        OperationGuard {
            store: self,
            operation,
            operation_id,
            resolved: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self, apply: impl FnOnce(&mut PipelineState)) -> PipelineState {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.state.loading = inner.in_flight > 0;
        apply(&mut inner.state);
        inner.state.clone()
    }

    fn publish<const N: usize>(&self, events: [PipelineEvent; N]) {
        for event in events {
            // No subscribers is fine; presentation may poll snapshots instead.
            let _ = self.events.send(event);
        }
    }

    fn record_failure(
        &self,
        operation: Operation,
        operation_id: OperationId,
        report: FailureReport,
    ) {
        let snapshot = self.finish(|state| {
            state.error = Some(report.message.clone());
            state.error_kind = Some(report.kind);
        });
        self.publish([
            PipelineEvent::StateChanged(snapshot),
            PipelineEvent::Failed {
                operation_id,
                operation,
                report,
            },
        ]);
    }
}

pub struct OperationGuard<'a> {
    store: &'a PipelineStore,
    operation: Operation,
    operation_id: OperationId,
    resolved: bool,
}

impl OperationGuard<'_> {
    pub fn complete_acquisition(mut self, reading: SensorReading) {
        self.resolved = true;
        let snapshot = self.store.finish(|state| {
            state.reading = Some(reading.clone());
            state.recommendation = None;
            state.error = None;
            state.error_kind = None;
            state.acquired_at = Some(Utc::now());
        });
        self.store.publish([
            PipelineEvent::StateChanged(snapshot),
            PipelineEvent::ReadingAcquired {
                operation_id: self.operation_id,
                reading,
            },
        ]);
    }

    pub fn complete_submission(mut self, recommendation: Recommendation) {
        self.resolved = true;
        let snapshot = self.store.finish(|state| {
            state.recommendation = Some(recommendation.clone());
            state.error = None;
            state.error_kind = None;
        });
        self.store.publish([
            PipelineEvent::StateChanged(snapshot),
            PipelineEvent::RecommendationReady {
                operation_id: self.operation_id,
                recommendation,
            },
        ]);
    }

    pub fn fail(mut self, error: &PipelineError) {
        self.resolved = true;
        self.store
            .record_failure(self.operation, self.operation_id, error.report());
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if self.resolved {
            return;
        }
        let what = match self.operation {
            Operation::Acquisition => "Sensor reading",
            Operation::Submission => "Recommendation request",
        };
        self.store.record_failure(
            self.operation,
            self.operation_id,
            FailureReport::new(
                ErrorKind::Network,
                format!("{what} was interrupted before completion"),
            ),
        );
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;

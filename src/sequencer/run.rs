/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Sequence executor: one run per acquired operation slot.
//!
//! A [`SequenceRun`] walks its step list on a spawned task while holding the
//! dispatcher's exclusive slot permit. Preemption is a `watch` counter
//! bumped by every emergency stop: the run checks it before each step,
//! selects on it during every hold (the only suspension points), and
//! re-checks it when a transition is rejected so a stop that raced the edge
//! is classified as an abort rather than a failure.

use super::steps::{SequenceKind, SequenceStep, terminal_transition};
use crate::audit::{AuditLog, OperationRecord};
use crate::error::GateError;
use crate::gate::{Gate, GateSnapshot, OperationOutcome};
use crate::sound::{SharedSink, SoundPhase, Timeline};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, watch};
use tracing::{error, info, warn};
use uuid::Uuid;

/// One executing operation sequence.
pub(crate) struct SequenceRun {
    gate: Arc<Gate>,
    timeline: Arc<Timeline>,
    sink: SharedSink,
    audit: Arc<dyn AuditLog>,
    preempt: watch::Receiver<u64>,
    operation_id: Uuid,
    kind: SequenceKind,
    steps: Vec<SequenceStep>,
}

impl SequenceRun {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        gate: Arc<Gate>,
        timeline: Arc<Timeline>,
        sink: SharedSink,
        audit: Arc<dyn AuditLog>,
        preempt: watch::Receiver<u64>,
        operation_id: Uuid,
        kind: SequenceKind,
        steps: Vec<SequenceStep>,
    ) -> Self {
        Self {
            gate,
            timeline,
            sink,
            audit,
            preempt,
            operation_id,
            kind,
            steps,
        }
    }

    /// Executes the sequence to a terminal outcome, releasing the slot
    /// permit when done.
    pub(crate) async fn run(mut self, permit: OwnedSemaphorePermit) -> OperationOutcome {
        let steps = std::mem::take(&mut self.steps);
        let terminal = terminal_transition(&steps);
        let mut final_snapshot: Option<GateSnapshot> = None;

        for (index, step) in steps.iter().enumerate() {
            if self.preempt_pending() {
                return self.abort(permit);
            }
            match step {
                SequenceStep::Cue(phase) => self.dispatch_cues(*phase),
                SequenceStep::Hold(duration) => {
                    if !self.hold(*duration).await {
                        return self.abort(permit);
                    }
                }
                SequenceStep::Transition(to) => {
                    let result = if Some(index) == terminal {
                        self.gate.complete_operation(*to)
                    } else {
                        self.gate.transition(*to)
                    };
                    match result {
                        Ok(snapshot) => final_snapshot = Some(snapshot),
                        // A preempting stop can win the race for the status
                        // lock between our check and this edge.
                        Err(_) if self.preempt_pending() => return self.abort(permit),
                        Err(err) => return self.fail(permit, &err),
                    }
                }
            }
        }

        if let Some(snapshot) = final_snapshot {
            self.record(&snapshot);
        }
        info!(operation_id = %self.operation_id, kind = %self.kind, "sequence completed");
        drop(permit);
        OperationOutcome::Completed
    }

    /// Cancellable wait. Returns `false` if preempted before the time is up.
    async fn hold(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            // Ok: stop signalled. Err: dispatcher gone, stop the barrier too.
            _ = self.preempt.changed() => false,
        }
    }

    fn preempt_pending(&self) -> bool {
        self.preempt.has_changed().unwrap_or(true)
    }

    fn dispatch_cues(&self, phase: SoundPhase) {
        if self.gate.sound_enabled() {
            self.timeline.dispatch_phase(phase, &self.sink);
        }
    }

    fn abort(self, permit: OwnedSemaphorePermit) -> OperationOutcome {
        let snapshot = self.gate.abort_operation();
        self.dispatch_cues(SoundPhase::EmergencyAlert);
        warn!(operation_id = %self.operation_id, kind = %self.kind, "sequence aborted by emergency stop");
        self.record(&snapshot);
        drop(permit);
        OperationOutcome::Aborted
    }

    fn fail(self, permit: OwnedSemaphorePermit, err: &GateError) -> OperationOutcome {
        let snapshot = self.gate.fail_operation();
        error!(operation_id = %self.operation_id, kind = %self.kind, %err, "sequence failed");
        self.record(&snapshot);
        drop(permit);
        OperationOutcome::Failed
    }

    fn record(&self, snapshot: &GateSnapshot) {
        if let Some(record) = OperationRecord::from_snapshot(self.operation_id, snapshot) {
            self.audit.record(record);
        }
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Gate status record, operation bookkeeping and snapshots.

use super::position::GatePosition;
use serde::{Deserialize, Serialize};

/// Terminal outcome of one operation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The sequence ran every step to its end.
    Completed,
    /// An emergency stop preempted the sequence before its end.
    Aborted,
    /// The state machine rejected a transition mid-sequence.
    Failed,
}

impl std::fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Bookkeeping for the most recent operation sequence.
///
/// Installed when a sequence starts; `ended_at_ns` and `outcome` are stamped
/// together with the mutation that terminates the sequence, so no snapshot
/// ever shows a half-finished record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOperation {
    /// Payment transaction that triggered the operation, if any.
    pub transaction_id: Option<String>,
    /// Recognized vehicle plate, if any.
    pub vehicle_plate: Option<String>,
    /// Nanosecond Unix timestamp at which the sequence started.
    pub started_at_ns: u64,
    /// Nanosecond Unix timestamp at which the sequence terminated.
    pub ended_at_ns: Option<u64>,
    /// Terminal outcome, absent while the sequence is still running.
    pub outcome: Option<OperationOutcome>,
}

/// Mutable status of one gate. Exactly one exists per [`Gate`] instance and
/// it lives for the life of the gate.
///
/// [`Gate`]: super::machine::Gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateStatus {
    /// Identifier carried into snapshots and logs.
    pub gate_id: String,
    /// Current barrier position.
    pub position: GatePosition,
    /// Whether cue dispatch is enabled.
    pub sound_enabled: bool,
    /// Strictly increasing version, bumped on every broadcast-producing
    /// mutation. Observers use it to detect missed updates.
    pub sequence_version: u64,
    /// Most recent operation, if any sequence has run.
    pub last_operation: Option<LastOperation>,
}

impl GateStatus {
    /// Creates the initial status: closed, version zero, no history.
    #[must_use]
    pub fn new(gate_id: impl Into<String>, sound_enabled: bool) -> Self {
        Self {
            gate_id: gate_id.into(),
            position: GatePosition::Closed,
            sound_enabled,
            sequence_version: 0,
            last_operation: None,
        }
    }

    /// Takes an immutable snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            gate_id: self.gate_id.clone(),
            position: self.position,
            sound_enabled: self.sound_enabled,
            sequence_version: self.sequence_version,
            last_operation: self.last_operation.clone(),
        }
    }

    /// Stamps the running operation's terminal outcome and end time.
    pub(crate) fn finish_operation(&mut self, outcome: OperationOutcome) {
        if let Some(op) = &mut self.last_operation {
            op.ended_at_ns = Some(nanos_since_epoch());
            op.outcome = Some(outcome);
        }
    }
}

/// Immutable copy of a [`GateStatus`] at a point in time.
///
/// Snapshots are what the broadcaster delivers to observers and what
/// `get_status` queries return. Serializable for transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateSnapshot {
    /// Identifier of the gate this snapshot describes.
    pub gate_id: String,
    /// Barrier position at snapshot time.
    pub position: GatePosition,
    /// Whether cue dispatch was enabled at snapshot time.
    pub sound_enabled: bool,
    /// Version of the mutation that produced this snapshot.
    pub sequence_version: u64,
    /// Operation bookkeeping at snapshot time.
    pub last_operation: Option<LastOperation>,
}

impl GateSnapshot {
    /// Serializes the snapshot to a JSON string for transport.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails,
    /// which cannot happen for these plain-data fields in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Returns the current time in nanoseconds since the Unix epoch.
#[inline]
pub(crate) fn nanos_since_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        let status = GateStatus::new("main_gate", true);
        assert_eq!(status.position, GatePosition::Closed);
        assert_eq!(status.sequence_version, 0);
        assert!(status.last_operation.is_none());
    }

    #[test]
    fn test_finish_without_operation_is_noop() {
        let mut status = GateStatus::new("main_gate", true);
        status.finish_operation(OperationOutcome::Completed);
        assert!(status.last_operation.is_none());
    }

    #[test]
    fn test_snapshot_serializes_position_as_snake_case() {
        let mut status = GateStatus::new("main_gate", true);
        status.position = GatePosition::EmergencyStopped;
        let json = status.snapshot().to_json().unwrap();
        assert!(json.contains("\"emergency_stopped\""), "{json}");
    }
}

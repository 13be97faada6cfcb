/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Audit trail: one record per terminal operation outcome.
//!
//! The audit collaborator lives outside this core; [`AuditLog`] is its
//! interface. The sequencer appends exactly one [`OperationRecord`] when a
//! run reaches `Completed`, `Aborted` or `Failed`. [`InMemoryAuditLog`]
//! preserves insertion order for tests and short-lived workloads;
//! [`TracingAuditLog`] emits each record as a structured log event for
//! deployments where the collaborator scrapes logs.

use crate::gate::{GateSnapshot, OperationOutcome};
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Record of one finished operation sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    /// Identifier assigned to the sequence run.
    pub operation_id: Uuid,
    /// Payment transaction that triggered the run, if any.
    pub transaction_id: Option<String>,
    /// Recognized vehicle plate, if any.
    pub vehicle_plate: Option<String>,
    /// Nanosecond Unix timestamp of the run start.
    pub started_at_ns: u64,
    /// Nanosecond Unix timestamp of the terminal outcome.
    pub ended_at_ns: u64,
    /// How the run ended.
    pub outcome: OperationOutcome,
}

impl OperationRecord {
    /// Builds a record from a terminal snapshot, or `None` if the snapshot
    /// carries no stamped operation.
    #[must_use]
    pub fn from_snapshot(operation_id: Uuid, snapshot: &GateSnapshot) -> Option<Self> {
        let op = snapshot.last_operation.as_ref()?;
        Some(Self {
            operation_id,
            transaction_id: op.transaction_id.clone(),
            vehicle_plate: op.vehicle_plate.clone(),
            started_at_ns: op.started_at_ns,
            ended_at_ns: op.ended_at_ns?,
            outcome: op.outcome?,
        })
    }
}

/// Append-only sink for terminal operation records.
pub trait AuditLog: Send + Sync {
    /// Appends one record. Implementations must preserve call order.
    fn record(&self, record: OperationRecord);
}

/// In-memory implementation of [`AuditLog`].
///
/// # Examples
///
/// ```
/// use boomgate_rs::audit::InMemoryAuditLog;
///
/// let audit = InMemoryAuditLog::new();
/// assert!(audit.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<OperationRecord>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all stored records, in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Returns `true` if no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, record: OperationRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

/// [`AuditLog`] that forwards each record to the `audit` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn record(&self, record: OperationRecord) {
        info!(
            target: "audit",
            operation_id = %record.operation_id,
            transaction_id = record.transaction_id.as_deref().unwrap_or("-"),
            vehicle_plate = record.vehicle_plate.as_deref().unwrap_or("-"),
            started_at_ns = record.started_at_ns,
            ended_at_ns = record.ended_at_ns,
            outcome = %record.outcome,
            "operation finished"
        );
    }
}

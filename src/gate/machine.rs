/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Locked gate core: serialized mutation and strictly-ordered publication.
//!
//! [`Gate`] wraps [`GateStatus`] in a mutex and pairs every accepted mutation
//! with a version bump and a broadcast, all inside the critical section.
//! That single discipline yields the two core guarantees: no observer ever
//! sees a partially-applied transition, and snapshots arrive in exactly
//! `sequence_version` order.

use super::position::GatePosition;
use super::status::{GateSnapshot, GateStatus, LastOperation, OperationOutcome};
use crate::broadcast::{Broadcaster, StatusSubscription};
use crate::error::GateError;
use crate::gate::status::nanos_since_epoch;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// A single gate: status, lock and broadcaster.
///
/// Constructed once per physical gate and shared behind an `Arc`. All
/// mutating methods take `&self`; serialization happens on the internal
/// mutex.
///
/// # Examples
///
/// ```
/// use boomgate_rs::broadcast::Broadcaster;
/// use boomgate_rs::gate::{Gate, GatePosition};
///
/// let gate = Gate::new("main_gate", true, Broadcaster::new());
/// let snapshot = gate.transition(GatePosition::Opening).unwrap();
/// assert_eq!(snapshot.sequence_version, 1);
/// ```
pub struct Gate {
    status: Mutex<GateStatus>,
    broadcaster: Broadcaster,
}

impl Gate {
    /// Creates a gate in the closed position with version zero.
    #[must_use]
    pub fn new(gate_id: impl Into<String>, sound_enabled: bool, broadcaster: Broadcaster) -> Self {
        Self {
            status: Mutex::new(GateStatus::new(gate_id, sound_enabled)),
            broadcaster,
        }
    }

    /// Registers an observer for all subsequent snapshots.
    #[must_use]
    pub fn subscribe(&self) -> StatusSubscription {
        self.broadcaster.subscribe()
    }

    /// Removes a previously registered observer.
    pub fn unsubscribe(&self, observer_id: u64) {
        self.broadcaster.unsubscribe(observer_id);
    }

    /// Takes a consistent snapshot of the current status.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot {
        self.lock().snapshot()
    }

    /// Current barrier position.
    #[must_use]
    pub fn position(&self) -> GatePosition {
        self.lock().position
    }

    /// Whether cue dispatch is currently enabled.
    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.lock().sound_enabled
    }

    /// Applies a legal transition, bumps the version and broadcasts.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidTransition`] and leaves the status
    /// untouched if the edge is not legal from the current position.
    pub fn transition(&self, to: GatePosition) -> Result<GateSnapshot, GateError> {
        self.transition_inner(to, None)
    }

    /// Applies the final transition of a sequence, stamping the operation
    /// [`Completed`](OperationOutcome::Completed) in the same mutation.
    ///
    /// Folding the stamp into the transition keeps one version bump per
    /// transition: an OPEN followed by a CLOSE advances the version by
    /// exactly four.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidTransition`] if the edge is not legal.
    pub fn complete_operation(&self, to: GatePosition) -> Result<GateSnapshot, GateError> {
        self.transition_inner(to, Some(OperationOutcome::Completed))
    }

    fn transition_inner(
        &self,
        to: GatePosition,
        stamp: Option<OperationOutcome>,
    ) -> Result<GateSnapshot, GateError> {
        let mut status = self.lock();
        if !status.position.can_transition_to(to) {
            return Err(GateError::InvalidTransition {
                from: status.position,
                attempted: to,
            });
        }
        let from = status.position;
        status.position = to;
        if let Some(outcome) = stamp {
            status.finish_operation(outcome);
        }
        let snapshot = Self::bump_and_publish(&self.broadcaster, &mut status);
        info!(gate_id = %snapshot.gate_id, %from, %to, version = snapshot.sequence_version, "gate transition");
        Ok(snapshot)
    }

    /// Installs fresh operation bookkeeping for a starting sequence.
    ///
    /// Does not bump or broadcast: the record becomes visible with the
    /// sequence's first transition snapshot.
    pub fn begin_operation(
        &self,
        transaction_id: Option<String>,
        vehicle_plate: Option<String>,
    ) -> u64 {
        let started_at_ns = nanos_since_epoch();
        let mut status = self.lock();
        status.last_operation = Some(LastOperation {
            transaction_id,
            vehicle_plate,
            started_at_ns,
            ended_at_ns: None,
            outcome: None,
        });
        started_at_ns
    }

    /// Forces the emergency-stopped position from any state.
    ///
    /// Returns `None` without mutating when the gate is already stopped, so
    /// repeated stops stay idempotent and versions strictly increasing.
    pub fn emergency_stop(&self) -> Option<GateSnapshot> {
        let mut status = self.lock();
        if status.position == GatePosition::EmergencyStopped {
            return None;
        }
        status.position = GatePosition::EmergencyStopped;
        Some(Self::bump_and_publish(&self.broadcaster, &mut status))
    }

    /// Terminates a preempted sequence: stamps
    /// [`Aborted`](OperationOutcome::Aborted), forces the stopped position if
    /// the dispatcher has not already, bumps and broadcasts.
    pub fn abort_operation(&self) -> GateSnapshot {
        let mut status = self.lock();
        status.position = GatePosition::EmergencyStopped;
        status.finish_operation(OperationOutcome::Aborted);
        Self::bump_and_publish(&self.broadcaster, &mut status)
    }

    /// Terminates a sequence whose transition was rejected: stamps
    /// [`Failed`](OperationOutcome::Failed) at the current position, bumps
    /// and broadcasts.
    pub fn fail_operation(&self) -> GateSnapshot {
        let mut status = self.lock();
        status.finish_operation(OperationOutcome::Failed);
        Self::bump_and_publish(&self.broadcaster, &mut status)
    }

    /// Manual reset: `EMERGENCY_STOPPED -> CLOSED`, clearing the operation
    /// history marker.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidTransition`] when the gate is not
    /// emergency-stopped.
    pub fn reset(&self) -> Result<GateSnapshot, GateError> {
        let mut status = self.lock();
        if status.position != GatePosition::EmergencyStopped {
            return Err(GateError::InvalidTransition {
                from: status.position,
                attempted: GatePosition::Closed,
            });
        }
        status.position = GatePosition::Closed;
        status.last_operation = None;
        let snapshot = Self::bump_and_publish(&self.broadcaster, &mut status);
        info!(gate_id = %snapshot.gate_id, "gate reset to closed");
        Ok(snapshot)
    }

    /// Flips the sound flag, bumps and broadcasts.
    pub fn toggle_sound(&self) -> GateSnapshot {
        let mut status = self.lock();
        status.sound_enabled = !status.sound_enabled;
        let snapshot = Self::bump_and_publish(&self.broadcaster, &mut status);
        info!(gate_id = %snapshot.gate_id, enabled = snapshot.sound_enabled, "sound toggled");
        snapshot
    }

    fn bump_and_publish(
        broadcaster: &Broadcaster,
        status: &mut MutexGuard<'_, GateStatus>,
    ) -> GateSnapshot {
        status.sequence_version += 1;
        let snapshot = status.snapshot();
        broadcaster.publish(&snapshot);
        snapshot
    }

    fn lock(&self) -> MutexGuard<'_, GateStatus> {
        // Mutations are applied whole before any await point can exist, so a
        // poisoned guard still holds a fully-formed status.
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

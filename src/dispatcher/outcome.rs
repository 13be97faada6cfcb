/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Acknowledgements returned by `submit`.

use crate::error::GateError;
use crate::gate::GateSnapshot;
use crate::sequencer::SequenceKind;
use uuid::Uuid;

/// What the dispatcher did with an accepted request.
///
/// Sequences run in the background: `SequenceStarted` acknowledges the
/// start, not the finish. Everything else is applied synchronously and the
/// acknowledgement carries the resulting snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A sequence was started on its own task.
    SequenceStarted {
        /// Identifier assigned to the run, carried in logs and audit records.
        operation_id: Uuid,
        /// Which sequence started.
        kind: SequenceKind,
    },
    /// The emergency stop was applied (or the gate was already stopped).
    EmergencyApplied {
        /// Snapshot after the stop.
        snapshot: GateSnapshot,
    },
    /// An emergency-stopped gate was manually reset to closed.
    ResetApplied {
        /// Snapshot after the reset.
        snapshot: GateSnapshot,
    },
    /// The sound flag was flipped.
    SoundToggled {
        /// Snapshot after the flip.
        snapshot: GateSnapshot,
    },
    /// Synchronous status query.
    Status {
        /// Current snapshot.
        snapshot: GateSnapshot,
    },
    /// An automated trigger was turned away without an error. The payment
    /// flow treats this as a quiet decline; the reason is logged.
    NotAccepted {
        /// Why the request was not accepted.
        error: GateError,
    },
}

impl SubmitOutcome {
    /// Returns `true` if the request resulted in gate work (a sequence,
    /// stop, reset or toggle), `false` for queries and quiet declines.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Status { .. } | Self::NotAccepted { .. })
    }
}

/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Error taxonomy for gate operations.
//!
//! All fallible operations in this crate report through [`GateError`]. The
//! variants split into hard failures that reach the caller
//! (`InvalidTransition`, `InvalidParameter`, `UnknownCommand`,
//! `MalformedRequest`), expected contention (`GateBusy`) and soft failures
//! (`AudioUnavailable`) that are logged and never abort a running sequence.

use crate::gate::GatePosition;
use thiserror::Error;

/// Errors reported by the dispatcher, state machine and audio boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The state machine rejected an edge. Either a caller asked for a
    /// sequence the gate cannot start from its current position, or a
    /// concurrent preemption invalidated an in-flight sequence.
    #[error("illegal gate transition from {from} to {attempted}")]
    InvalidTransition {
        /// Position the gate was in when the transition was requested.
        from: GatePosition,
        /// Position the transition would have moved to.
        attempted: GatePosition,
    },

    /// Another sequence currently holds the operation slot. Expected
    /// contention, not a defect: control-channel callers surface it,
    /// automated callers absorb it.
    #[error("gate is busy: another operation sequence is running")]
    GateBusy,

    /// A request carried an unusable parameter (e.g. a non-positive open
    /// duration).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The audio device or clip was unavailable. Soft failure: the caller
    /// logs it and the mechanical sequence proceeds on schedule.
    #[error("audio unavailable for clip {clip}")]
    AudioUnavailable {
        /// Identifier of the clip that could not be played.
        clip: String,
    },

    /// The wire boundary received a command word outside the recognized
    /// vocabulary.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The wire boundary received a payload that did not parse as a request.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Configuration input did not parse or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GateError {
    /// Returns `true` if this error must reach an automated caller.
    ///
    /// Automated triggers fire from a payment-completion context: a busy or
    /// mispositioned gate must never fail a completed payment, so only
    /// boundary-fatal errors propagate to that path.
    #[inline]
    #[must_use]
    pub fn is_fatal_for_automated(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_) | Self::UnknownCommand(_) | Self::MalformedRequest(_)
        )
    }
}

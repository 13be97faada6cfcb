/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Trigger requests and the wire-command vocabulary.

use crate::error::GateError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Commands the dispatcher accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    /// Run the open sequence.
    Open,
    /// Run the close sequence, or reset an emergency-stopped gate.
    Close,
    /// Run open, hold, close as one sequence.
    AutoCycle,
    /// Preempt whatever is running and stop the barrier.
    EmergencyStop,
    /// Flip cue dispatch on or off.
    ToggleSound,
    /// Query the current snapshot.
    GetStatus,
}

impl FromStr for GateCommand {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            "auto_cycle" => Ok(Self::AutoCycle),
            "emergency_stop" => Ok(Self::EmergencyStop),
            "toggle_sound" => Ok(Self::ToggleSound),
            "get_status" => Ok(Self::GetStatus),
            other => Err(GateError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for GateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::AutoCycle => "auto_cycle",
            Self::EmergencyStop => "emergency_stop",
            Self::ToggleSound => "toggle_sound",
            Self::GetStatus => "get_status",
        };
        write!(f, "{name}")
    }
}

/// Which of the two call paths a request arrived from.
///
/// Both paths funnel through the same dispatcher; the source only changes
/// error visibility. A busy gate must never fail a completed payment, so
/// [`AutomatedTrigger`](TriggerSource::AutomatedTrigger) callers have
/// non-fatal failures absorbed at the dispatcher boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// An operator session on the real-time control channel.
    ControlChannel,
    /// The payment-completion trigger.
    AutomatedTrigger,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ControlChannel => "control_channel",
            Self::AutomatedTrigger => "automated_trigger",
        };
        write!(f, "{name}")
    }
}

/// One trigger attempt, consumed by [`Dispatcher::submit`].
///
/// [`Dispatcher::submit`]: super::Dispatcher::submit
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    /// What to do.
    pub command: GateCommand,
    /// Payment transaction behind the trigger, if any.
    pub transaction_id: Option<String>,
    /// Recognized vehicle plate, if any.
    pub vehicle_plate: Option<String>,
    /// Auto-cycle dwell override, in seconds. Must be a positive number.
    pub open_duration_seconds: Option<f64>,
    /// Which call path the request arrived from.
    pub source: TriggerSource,
}

/// Wire shape of a control-channel payload.
#[derive(Debug, Deserialize)]
struct RawRequest {
    command: String,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    vehicle_plate: Option<String>,
    #[serde(default)]
    open_duration_seconds: Option<f64>,
}

impl OperationRequest {
    /// Creates a bare request for a command.
    #[must_use]
    pub fn new(command: GateCommand, source: TriggerSource) -> Self {
        Self {
            command,
            transaction_id: None,
            vehicle_plate: None,
            open_duration_seconds: None,
            source,
        }
    }

    /// Attaches the triggering payment transaction.
    #[must_use]
    pub fn with_transaction(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Attaches the recognized vehicle plate.
    #[must_use]
    pub fn with_plate(mut self, vehicle_plate: impl Into<String>) -> Self {
        self.vehicle_plate = Some(vehicle_plate.into());
        self
    }

    /// Overrides the auto-cycle dwell.
    #[must_use]
    pub fn with_open_duration(mut self, seconds: f64) -> Self {
        self.open_duration_seconds = Some(seconds);
        self
    }

    /// Parses a wire payload into a request.
    ///
    /// # Errors
    ///
    /// [`GateError::MalformedRequest`] if the payload is not a JSON object
    /// of the expected shape; [`GateError::UnknownCommand`] if the command
    /// word is outside the vocabulary.
    ///
    /// # Examples
    ///
    /// ```
    /// use boomgate_rs::dispatcher::{GateCommand, OperationRequest, TriggerSource};
    ///
    /// let request = OperationRequest::from_json(
    ///     r#"{"command": "auto_cycle", "open_duration_seconds": 8}"#,
    ///     TriggerSource::ControlChannel,
    /// )
    /// .unwrap();
    /// assert_eq!(request.command, GateCommand::AutoCycle);
    /// assert_eq!(request.open_duration_seconds, Some(8.0));
    /// ```
    pub fn from_json(payload: &str, source: TriggerSource) -> Result<Self, GateError> {
        let raw: RawRequest = serde_json::from_str(payload)
            .map_err(|e| GateError::MalformedRequest(e.to_string()))?;
        Ok(Self {
            command: raw.command.parse()?,
            transaction_id: raw.transaction_id,
            vehicle_plate: raw.vehicle_plate,
            open_duration_seconds: raw.open_duration_seconds,
            source,
        })
    }
}

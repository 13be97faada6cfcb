/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Gate configuration and sequence timings.
//!
//! [`GateConfig`] carries everything the dispatcher needs to wire a gate:
//! an identifier, the initial sound flag and the [`SequenceTimings`] that
//! shape every sequence and cue timeline. Both deserialize from JSON with
//! full defaults, so an empty object `{}` yields the stock gate.

use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs for the open/close sequences and their cue timelines.
///
/// Defaults match the stock actuator profile: three warning beeps half a
/// second apart before opening, two before closing, a 500 ms motor-cue lead,
/// three seconds of travel and a five second auto-cycle hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTimings {
    /// Spacing between consecutive warning beeps, in milliseconds.
    pub warning_interval_ms: u64,
    /// Number of warning beeps before an open sequence moves the barrier.
    pub open_warning_beeps: u32,
    /// Number of warning beeps before a close sequence moves the barrier.
    pub close_warning_beeps: u32,
    /// Offset of the motor-run cue after the motor-start cue, in milliseconds.
    pub motor_lead_ms: u64,
    /// Barrier travel time between closed and open, in milliseconds.
    pub travel_ms: u64,
    /// Auto-cycle hold at the open position when the caller supplies none,
    /// in seconds.
    pub default_open_secs: f64,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            warning_interval_ms: 500,
            open_warning_beeps: 3,
            close_warning_beeps: 2,
            motor_lead_ms: 500,
            travel_ms: 3_000,
            default_open_secs: 5.0,
        }
    }
}

impl SequenceTimings {
    /// Spacing between warning beeps.
    #[must_use]
    pub fn warning_interval(&self) -> Duration {
        Duration::from_millis(self.warning_interval_ms)
    }

    /// Lead time a sequence waits after dispatching its warning cues before
    /// the barrier starts moving: one interval per beep.
    #[must_use]
    pub fn warning_lead(&self, beeps: u32) -> Duration {
        Duration::from_millis(self.warning_interval_ms.saturating_mul(u64::from(beeps)))
    }

    /// Barrier travel time between the closed and open positions.
    #[must_use]
    pub fn travel(&self) -> Duration {
        Duration::from_millis(self.travel_ms)
    }

    /// Motor-run cue offset after motor start.
    #[must_use]
    pub fn motor_lead(&self) -> Duration {
        Duration::from_millis(self.motor_lead_ms)
    }

    /// Default auto-cycle hold at the open position.
    #[must_use]
    pub fn default_open_hold(&self) -> Duration {
        Duration::from_secs_f64(self.default_open_secs)
    }
}

/// Static configuration for one gate instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Identifier carried in logs and snapshots.
    pub gate_id: String,
    /// Whether cue dispatch starts enabled.
    pub sound_enabled: bool,
    /// Sequence timings.
    pub timings: SequenceTimings,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            gate_id: "main_gate".to_string(),
            sound_enabled: true,
            timings: SequenceTimings::default(),
        }
    }
}

impl GateConfig {
    /// Parses a configuration from a JSON string, validating the timings.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidConfig`] if the payload does not parse or
    /// carries a non-positive travel time or default open hold.
    ///
    /// # Examples
    ///
    /// ```
    /// use boomgate_rs::GateConfig;
    ///
    /// let config = GateConfig::from_json(r#"{"gate_id": "north_exit"}"#).unwrap();
    /// assert_eq!(config.gate_id, "north_exit");
    /// assert_eq!(config.timings.travel_ms, 3_000);
    /// ```
    pub fn from_json(payload: &str) -> Result<Self, GateError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|e| GateError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GateError> {
        if self.timings.travel_ms == 0 {
            return Err(GateError::InvalidConfig(
                "travel_ms must be positive".to_string(),
            ));
        }
        if !(self.timings.default_open_secs.is_finite() && self.timings.default_open_secs > 0.0) {
            return Err(GateError::InvalidConfig(
                "default_open_secs must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

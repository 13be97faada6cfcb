/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Barrier positions and the legal edges between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical position of the barrier arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePosition {
    /// Barrier down, traffic blocked. Initial state.
    Closed,
    /// Barrier travelling upward.
    Opening,
    /// Barrier up, traffic may pass.
    Open,
    /// Barrier travelling downward.
    Closing,
    /// Motion halted by an emergency stop; requires an explicit reset.
    EmergencyStopped,
}

impl GatePosition {
    /// Returns `true` if the edge `self -> to` is legal.
    ///
    /// Any position may move to [`EmergencyStopped`], except
    /// [`EmergencyStopped`] itself: the only way out of it is the reset edge
    /// back to [`Closed`].
    ///
    /// [`EmergencyStopped`]: GatePosition::EmergencyStopped
    /// [`Closed`]: GatePosition::Closed
    #[must_use]
    pub fn can_transition_to(self, to: GatePosition) -> bool {
        use GatePosition::*;
        matches!(
            (self, to),
            (Closed, Opening)
                | (Opening, Open)
                | (Open, Closing)
                | (Closing, Closed)
                | (Closed | Opening | Open | Closing, EmergencyStopped)
                | (EmergencyStopped, Closed)
        )
    }

}

impl fmt::Display for GatePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::EmergencyStopped => "emergency_stopped",
        };
        write!(f, "{name}")
    }
}

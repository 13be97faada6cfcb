/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Sequence definitions: fixed ordered step lists.
//!
//! Sequences are data, built by pure functions from [`SequenceTimings`], so
//! their shape is testable without a runtime. The executor in
//! [`run`](super::run) walks the list and owns all timing and preemption
//! concerns.

use crate::config::SequenceTimings;
use crate::gate::GatePosition;
use crate::sound::SoundPhase;
use std::fmt;
use std::time::Duration;

/// The three operation sequences a gate can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Warning cues, raise the barrier, confirm.
    Open,
    /// Warning cues, lower the barrier, confirm.
    Close,
    /// Open, hold at the open position, close.
    AutoCycle,
}

impl SequenceKind {
    /// Position the gate must be in for this sequence to start.
    #[must_use]
    pub fn expected_start(self) -> GatePosition {
        match self {
            Self::Open | Self::AutoCycle => GatePosition::Closed,
            Self::Close => GatePosition::Open,
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::AutoCycle => "auto_cycle",
        };
        write!(f, "{name}")
    }
}

/// One step of a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStep {
    /// Dispatch the cues of a phase, fire-and-forget.
    Cue(SoundPhase),
    /// Cancellable wait: the only kind of step that suspends.
    Hold(Duration),
    /// Drive the state machine along one edge.
    Transition(GatePosition),
}

/// Builds the step list for `kind`.
///
/// `open_hold` is the auto-cycle dwell at the open position; ignored for
/// plain open/close.
#[must_use]
pub fn steps_for(
    kind: SequenceKind,
    timings: &SequenceTimings,
    open_hold: Duration,
) -> Vec<SequenceStep> {
    match kind {
        SequenceKind::Open => open_steps(timings),
        SequenceKind::Close => close_steps(timings),
        SequenceKind::AutoCycle => {
            let mut steps = open_steps(timings);
            steps.push(SequenceStep::Hold(open_hold));
            steps.extend(close_steps(timings));
            steps
        }
    }
}

fn open_steps(timings: &SequenceTimings) -> Vec<SequenceStep> {
    vec![
        SequenceStep::Cue(SoundPhase::OpenWarning),
        SequenceStep::Hold(timings.warning_lead(timings.open_warning_beeps)),
        SequenceStep::Transition(GatePosition::Opening),
        SequenceStep::Cue(SoundPhase::MotorStart),
        SequenceStep::Hold(timings.travel()),
        SequenceStep::Transition(GatePosition::Open),
        SequenceStep::Cue(SoundPhase::OpenConfirmed),
    ]
}

fn close_steps(timings: &SequenceTimings) -> Vec<SequenceStep> {
    vec![
        SequenceStep::Cue(SoundPhase::CloseWarning),
        SequenceStep::Hold(timings.warning_lead(timings.close_warning_beeps)),
        SequenceStep::Transition(GatePosition::Closing),
        SequenceStep::Cue(SoundPhase::MotorStart),
        SequenceStep::Hold(timings.travel()),
        SequenceStep::Transition(GatePosition::Closed),
        SequenceStep::Cue(SoundPhase::CloseConfirmed),
    ]
}

/// Index of the last transition in a step list: the one whose snapshot
/// carries the `Completed` stamp.
#[must_use]
pub(crate) fn terminal_transition(steps: &[SequenceStep]) -> Option<usize> {
    steps
        .iter()
        .rposition(|step| matches!(step, SequenceStep::Transition(_)))
}

/// Total scheduled duration of a step list (sum of its holds).
#[must_use]
pub fn scheduled_duration(steps: &[SequenceStep]) -> Duration {
    steps
        .iter()
        .filter_map(|step| match step {
            SequenceStep::Hold(d) => Some(*d),
            _ => None,
        })
        .sum()
}

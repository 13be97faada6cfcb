/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Cue timelines: which clips play at which offsets for each phase.

use super::sink::SharedSink;
use crate::config::SequenceTimings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Audio clips the actuator knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipId {
    /// Repeated high-pitched beep before the barrier moves.
    WarningBeep,
    /// Motor spin-up.
    MotorStart,
    /// Motor running at speed.
    MotorRun,
    /// Motor wind-down.
    MotorStop,
    /// Barrier reached the open position.
    GateOpen,
    /// Barrier reached the closed position.
    GateClose,
    /// Emergency / fault tone.
    ErrorTone,
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WarningBeep => "warning_beep",
            Self::MotorStart => "motor_start",
            Self::MotorRun => "motor_run",
            Self::MotorStop => "motor_stop",
            Self::GateOpen => "gate_open",
            Self::GateClose => "gate_close",
            Self::ErrorTone => "error_tone",
        };
        write!(f, "{name}")
    }
}

/// Named phases a sequence passes through, each with its own cue list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundPhase {
    /// Warning beeps before an open sequence moves the barrier.
    OpenWarning,
    /// Warning beeps before a close sequence moves the barrier.
    CloseWarning,
    /// Motor spin-up while the barrier travels.
    MotorStart,
    /// Barrier arrived open: motor stop plus confirmation.
    OpenConfirmed,
    /// Barrier arrived closed: motor stop plus confirmation.
    CloseConfirmed,
    /// Emergency stop tone.
    EmergencyAlert,
}

/// One timed audio-cue event: play `clip` at `offset_ms` into `phase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCue {
    /// Phase this cue belongs to.
    pub phase: SoundPhase,
    /// Offset from the phase start, in milliseconds.
    pub offset_ms: u64,
    /// Clip to play.
    pub clip: ClipId,
}

impl SoundCue {
    /// Offset from the phase start.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.offset_ms)
    }
}

/// Immutable cue timeline for one gate, built once from its timings.
///
/// `cues_for` is deterministic and side-effect-free; `dispatch_phase` is the
/// playback side effect and must run inside a tokio runtime (offset cues are
/// spawned as independent sleep-then-play tasks).
///
/// # Examples
///
/// ```
/// use boomgate_rs::config::SequenceTimings;
/// use boomgate_rs::sound::{SoundPhase, Timeline};
///
/// let timeline = Timeline::new(&SequenceTimings::default());
/// assert_eq!(timeline.cues_for(SoundPhase::OpenWarning).len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Timeline {
    open_warning: Vec<SoundCue>,
    close_warning: Vec<SoundCue>,
    motor_start: Vec<SoundCue>,
    open_confirmed: Vec<SoundCue>,
    close_confirmed: Vec<SoundCue>,
    emergency_alert: Vec<SoundCue>,
}

fn cue(phase: SoundPhase, offset_ms: u64, clip: ClipId) -> SoundCue {
    SoundCue {
        phase,
        offset_ms,
        clip,
    }
}

fn beeps(phase: SoundPhase, count: u32, interval_ms: u64) -> Vec<SoundCue> {
    (0..u64::from(count))
        .map(|i| cue(phase, i * interval_ms, ClipId::WarningBeep))
        .collect()
}

impl Timeline {
    /// Builds the cue lists for the given timings.
    #[must_use]
    pub fn new(timings: &SequenceTimings) -> Self {
        use SoundPhase::*;
        let interval = timings.warning_interval_ms;
        let lead = timings.motor_lead_ms;
        Self {
            open_warning: beeps(OpenWarning, timings.open_warning_beeps, interval),
            close_warning: beeps(CloseWarning, timings.close_warning_beeps, interval),
            motor_start: vec![
                cue(MotorStart, 0, ClipId::MotorStart),
                cue(MotorStart, lead, ClipId::MotorRun),
            ],
            open_confirmed: vec![
                cue(OpenConfirmed, 0, ClipId::MotorStop),
                cue(OpenConfirmed, lead, ClipId::GateOpen),
            ],
            close_confirmed: vec![
                cue(CloseConfirmed, 0, ClipId::MotorStop),
                cue(CloseConfirmed, lead, ClipId::GateClose),
            ],
            emergency_alert: vec![cue(EmergencyAlert, 0, ClipId::ErrorTone)],
        }
    }

    /// Returns the ordered cue list for a phase.
    #[must_use]
    pub fn cues_for(&self, phase: SoundPhase) -> &[SoundCue] {
        match phase {
            SoundPhase::OpenWarning => &self.open_warning,
            SoundPhase::CloseWarning => &self.close_warning,
            SoundPhase::MotorStart => &self.motor_start,
            SoundPhase::OpenConfirmed => &self.open_confirmed,
            SoundPhase::CloseConfirmed => &self.close_confirmed,
            SoundPhase::EmergencyAlert => &self.emergency_alert,
        }
    }

    /// Fires every cue of a phase at the sink, fire-and-forget.
    ///
    /// Zero-offset cues play inline; offset cues are spawned so the caller
    /// never waits. Play failures are logged and swallowed: the mechanical
    /// sequence proceeds on schedule regardless of audio health.
    pub fn dispatch_phase(&self, phase: SoundPhase, sink: &SharedSink) {
        for cue in self.cues_for(phase) {
            if cue.offset_ms == 0 {
                play_soft(sink, cue);
            } else {
                let sink = sink.clone();
                let cue = cue.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(cue.offset()).await;
                    play_soft(&sink, &cue);
                });
            }
        }
    }
}

fn play_soft(sink: &SharedSink, cue: &SoundCue) {
    if let Err(err) = sink.play(cue) {
        warn!(%err, clip = %cue.clip, phase = ?cue.phase, "cue dropped, sequence continues");
    }
}

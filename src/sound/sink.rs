/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Audio playback boundary.

use super::timeline::SoundCue;
use crate::error::GateError;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a playback backend.
pub type SharedSink = Arc<dyn AudioSink>;

/// Playback backend for sound cues.
///
/// `play` dispatches one cue and returns without waiting for the clip to
/// finish. A sink that cannot play reports
/// [`GateError::AudioUnavailable`]; callers treat that as non-fatal.
pub trait AudioSink: Send + Sync {
    /// Dispatches one cue to the audio backend.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::AudioUnavailable`] when the device or clip
    /// cannot be played.
    fn play(&self, cue: &SoundCue) -> Result<(), GateError>;
}

/// Default sink: emits each cue as a structured log event.
///
/// The simulator models sound stages as abstract timed events, so "playback"
/// is a `debug!` record carrying the clip and phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AudioSink for TracingSink {
    fn play(&self, cue: &SoundCue) -> Result<(), GateError> {
        debug!(clip = %cue.clip, phase = ?cue.phase, offset_ms = cue.offset_ms, "cue");
        Ok(())
    }
}

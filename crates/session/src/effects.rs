//! Presentation side effects the session triggers but does not implement.

use crate::notify::OverlayCommand;

/// Audio cues the session can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Played when the monster reveals itself.
    Scream,
}

/// Sink for audio, time scale and overlay effects.
///
/// Implementations must not call back into the session.
pub trait Effects {
    fn play_cue(&mut self, cue: AudioCue);

    /// Global simulation time scale: 0.0 while paused, 1.0 otherwise.
    fn set_time_scale(&mut self, scale: f64);

    fn overlay(&mut self, command: OverlayCommand);
}

/// Discards every effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEffects;

impl Effects for NullEffects {
    fn play_cue(&mut self, _cue: AudioCue) {}

    fn set_time_scale(&mut self, _scale: f64) {}

    fn overlay(&mut self, _command: OverlayCommand) {}
}

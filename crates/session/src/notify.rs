//! Notification sequencing.
//!
//! A notification shows an overlay, holds it, fades it out linearly over a
//! fixed number of steps and disposes it. Sequences are fire-and-forget: they
//! cannot be cancelled, never read session state, and run to completion
//! across later state changes. Ordering between overlapping sequences is not
//! part of the contract.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::seconds;

/// Which scripted overlay to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// The players discover the monster.
    MonsterRevealed,
    PlayersWin,
    MonsterWins,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonsterRevealed => "monster_revealed",
            Self::PlayersWin => "players_win",
            Self::MonsterWins => "monster_wins",
        }
    }
}

/// Identifies one running overlay.
pub type OverlayId = u64;

/// Rendering instructions produced by running sequences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayCommand {
    Show { id: OverlayId, kind: NotificationKind },
    /// Alpha channel only; color is left to the renderer.
    SetAlpha { id: OverlayId, alpha: f32 },
    Dispose { id: OverlayId },
}

/// Timing of every notification sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationTiming {
    /// Seconds the overlay stays fully opaque.
    pub hold_secs: f64,
    /// Number of discrete fade steps.
    pub fade_steps: u32,
    /// Seconds between fade steps.
    pub fade_interval_secs: f64,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            hold_secs: 2.0,
            fade_steps: 30,
            fade_interval_secs: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
struct Sequence {
    id: OverlayId,
    kind: NotificationKind,
    started_at: Duration,
    /// Next fade step to emit; `fade_steps` means dispose is next.
    next_step: u32,
}

/// Timer-driven queue of running notification sequences.
#[derive(Debug, Clone)]
pub struct Notifications {
    hold: Duration,
    interval: Duration,
    steps: u32,
    running: Vec<Sequence>,
    next_id: OverlayId,
}

impl Notifications {
    /// `timing` should already be validated; out-of-range values never fire.
    pub fn new(timing: NotificationTiming) -> Self {
        Self {
            hold: seconds(timing.hold_secs),
            interval: seconds(timing.fade_interval_secs),
            steps: timing.fade_steps,
            running: Vec::new(),
            next_id: 1,
        }
    }

    /// Start a sequence at simulation time `now`. Returns its `Show` command.
    pub fn play(&mut self, kind: NotificationKind, now: Duration) -> OverlayCommand {
        let id = self.next_id;
        self.next_id += 1;
        self.running.push(Sequence {
            id,
            kind,
            started_at: now,
            next_step: 0,
        });
        OverlayCommand::Show { id, kind }
    }

    /// Collect every command due at simulation time `now`.
    pub fn advance(&mut self, now: Duration) -> Vec<OverlayCommand> {
        let mut commands = Vec::new();
        let (hold, interval, steps) = (self.hold, self.interval, self.steps);

        self.running.retain_mut(|seq| {
            loop {
                let due = interval
                    .checked_mul(seq.next_step)
                    .and_then(|fade| seq.started_at.checked_add(hold)?.checked_add(fade));
                match due {
                    Some(due) if due <= now => {}
                    _ => return true,
                }
                if seq.next_step < steps {
                    let alpha = 1.0 - seq.next_step as f32 / steps as f32;
                    commands.push(OverlayCommand::SetAlpha { id: seq.id, alpha });
                    seq.next_step += 1;
                } else {
                    commands.push(OverlayCommand::Dispose { id: seq.id });
                    return false;
                }
            }
        });

        commands
    }

    /// Number of sequences still running.
    pub fn running(&self) -> usize {
        self.running.len()
    }

    /// Kinds of the running sequences, oldest first.
    pub fn running_kinds(&self) -> Vec<NotificationKind> {
        self.running.iter().map(|s| s.kind).collect()
    }
}

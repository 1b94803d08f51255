//! Session configuration.
//!
//! Loaded from RON, e.g.:
//!
//! ```ron
//! (
//!     seed: 7,
//!     phases: (first_phase_length: 45.0, second_phase_length: 120.0),
//!     phase_clock: PhaseEntry,
//! )
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::notify::NotificationTiming;

/// Phase length thresholds, in seconds. Immutable for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub first_phase_length: f64,
    pub second_phase_length: f64,
    pub ended_phase_length: f64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            first_phase_length: 10.0,
            second_phase_length: 20.0,
            ended_phase_length: 30.0,
        }
    }
}

impl PhaseDurations {
    pub fn first_phase(&self) -> Duration {
        seconds(self.first_phase_length)
    }

    pub fn second_phase(&self) -> Duration {
        seconds(self.second_phase_length)
    }

    pub fn ended_phase(&self) -> Duration {
        seconds(self.ended_phase_length)
    }
}

/// Convert validated seconds. Values `validate` rejects map to `Duration::MAX`.
pub(crate) fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// Which clock phase timeouts compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhaseClock {
    /// Time elapsed since the session started. A phase entered after its
    /// threshold has already passed times out on the next tick.
    #[default]
    Session,
    /// Time elapsed since the current phase was entered.
    PhaseEntry,
}

/// Configuration surface, fixed before `start_session`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for the monster draw.
    pub seed: u64,
    pub phases: PhaseDurations,
    pub phase_clock: PhaseClock,
    pub notifications: NotificationTiming,
}

impl SessionConfig {
    /// Read and validate a RON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every duration is finite, non-negative and representable, and
    /// that a whole notification sequence fits in a `Duration`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let seconds = [
            ("phases.first_phase_length", self.phases.first_phase_length),
            ("phases.second_phase_length", self.phases.second_phase_length),
            ("phases.ended_phase_length", self.phases.ended_phase_length),
            ("notifications.hold_secs", self.notifications.hold_secs),
            (
                "notifications.fade_interval_secs",
                self.notifications.fade_interval_secs,
            ),
        ];

        for (field, value) in seconds {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("{value} is not finite")));
            }
            if value < 0.0 {
                return Err(ConfigError::invalid(field, format!("{value} is negative")));
            }
            if let Err(e) = Duration::try_from_secs_f64(value) {
                return Err(ConfigError::invalid(field, format!("{value}: {e}")));
            }
        }

        let timing = &self.notifications;
        let span = Duration::from_secs_f64(timing.fade_interval_secs)
            .checked_mul(timing.fade_steps)
            .and_then(|fade| fade.checked_add(Duration::from_secs_f64(timing.hold_secs)));
        if span.is_none() {
            return Err(ConfigError::invalid(
                "notifications",
                "hold plus fade does not fit in a duration",
            ));
        }
        Ok(())
    }
}

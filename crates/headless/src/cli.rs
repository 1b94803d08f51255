//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::error::HeadlessError;
use crate::runner::{MAX_TICK_RATE_HZ, RunOptions};

/// Run a Lurker session headless at a fixed tick rate.
#[derive(Parser, Debug)]
#[command(name = "lurker-headless", version, about)]
pub struct Cli {
    /// RON session configuration; defaults apply when omitted.
    #[arg(short, long, env = "LURKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of simulated input pads.
    #[arg(long, default_value_t = 4)]
    pub pads: u32,

    /// Number of citizens to populate.
    #[arg(long, default_value_t = 8)]
    pub citizens: usize,

    /// Simulation steps per second.
    #[arg(long, default_value_t = 60)]
    pub tick_rate: u32,

    /// Stop after this much session time even if the session is not finished.
    #[arg(long, default_value_t = 120.0)]
    pub max_seconds: f64,

    /// Kill one citizen every this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub kill_citizen_every: Option<f64>,

    /// Have the first pad request a pause toggle at these session times.
    #[arg(long, value_name = "SECONDS", value_delimiter = ',')]
    pub pause_at: Vec<f64>,

    /// Emit logs as newline-delimited JSON.
    #[arg(long)]
    pub json: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate the runner arguments.
    pub fn run_options(&self) -> Result<RunOptions, HeadlessError> {
        if self.tick_rate == 0 || self.tick_rate > MAX_TICK_RATE_HZ {
            return Err(usage(
                "tick-rate",
                format!("must be between 1 and {MAX_TICK_RATE_HZ}"),
            ));
        }
        let max_time = session_time("max-seconds", self.max_seconds)?;
        let kill_citizen_every = match self.kill_citizen_every {
            Some(every) => {
                let every = session_time("kill-citizen-every", every)?;
                if every.is_zero() {
                    return Err(usage("kill-citizen-every", "must be positive"));
                }
                Some(every)
            }
            None => None,
        };
        let pause_at = self
            .pause_at
            .iter()
            .map(|&t| session_time("pause-at", t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RunOptions {
            pads: self.pads,
            citizens: self.citizens,
            tick_rate_hz: self.tick_rate,
            max_time,
            kill_citizen_every,
            pause_at,
        })
    }
}

/// Parse a seconds argument into a session time.
fn session_time(arg: &'static str, seconds: f64) -> Result<Duration, HeadlessError> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| usage(arg, format!("{seconds} is not a session time: {e}")))
}

fn usage(arg: &'static str, reason: impl Into<String>) -> HeadlessError {
    HeadlessError::Usage {
        arg,
        reason: reason.into(),
    }
}

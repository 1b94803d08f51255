//! Lurker Headless
//!
//! Runs a whole session at a fixed tick rate with simulated pads and logs
//! every transition and effect. Used for smoke runs and log inspection.

#![deny(unsafe_code)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod runner;

pub use error::{ExitCode, HeadlessError};
pub use runner::{RunOptions, RunSummary, run};

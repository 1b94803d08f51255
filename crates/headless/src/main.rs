//! `lurker-headless`: drive one session without a renderer.

use clap::Parser;

use lurker_headless::cli::Cli;
use lurker_headless::logging::{LogFormat, init_logging};
use lurker_headless::{ExitCode, HeadlessError, RunSummary, run};
use lurker_session::SessionConfig;

fn main() {
    let cli = Cli::parse();

    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    init_logging(format, cli.verbose);

    match execute(&cli) {
        Ok(summary) => {
            report(&summary);
            std::process::exit(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn execute(cli: &Cli) -> Result<RunSummary, HeadlessError> {
    let options = cli.run_options()?;
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    run(config, &options)
}

fn report(summary: &RunSummary) {
    let state = summary.final_state.map_or("unstarted", |s| s.as_str());
    println!(
        "{} ticks, {:.2}s elapsed, final state {state}, finished: {}, citizens killed: {}",
        summary.ticks,
        summary.elapsed.as_secs_f64(),
        summary.finished,
        summary.citizens_killed
    );
    for change in &summary.transitions {
        println!("  {:>8.2}s  {}", change.elapsed.as_secs_f64(), change.state);
    }
}

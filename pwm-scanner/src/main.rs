use clap::Parser;
use pwm_score::error::MotifError;

mod cli;
mod commands;

use cli::{init_verbose, Cli, Command};

#[derive(thiserror::Error, Debug)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Motif(#[from] MotifError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{failed} of {total} sequence files could not be scored")]
    FailedInputs { failed: usize, total: usize },
}

fn runner() -> Result<(), ScannerError> {
    let start_time = std::time::Instant::now();

    let cli = Cli::parse();
    init_verbose(cli.verbosity);
    log::info!(
        "Running {}-{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    match cli.command {
        Command::Score(args) => commands::run_score(args)?,
        Command::Wig(args) => commands::run_wig(args)?,
        Command::Genbank(args) => commands::run_genbank(args)?,
    }

    let elapsed = start_time.elapsed();
    log::info!(
        "Total execution time: {:.4} minutes",
        elapsed.as_secs_f64() / 60.0
    );
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

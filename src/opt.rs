use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

use crate::gist::DEFAULT_GIST_ID;

#[derive(Parser, Debug)]
#[clap(
    name = "eval-gist",
    version,
    about = "Compare two solutions on the input of a generator"
)]
pub struct Opt {
    /// Path to the sandbox runner executable
    #[clap(long, env = "RUNNER_BINARY")]
    pub runner: Option<PathBuf>,

    /// Identifier of the gist with the generator and the two solutions
    #[clap(default_value = DEFAULT_GIST_ID)]
    pub gist_id: String,

    /// Read the generator and the solutions from a local directory instead of a gist
    #[clap(long, conflicts_with = "gist_id")]
    pub local: Option<PathBuf>,

    /// Only print the fetched programs, without evaluating them
    #[clap(long)]
    pub fetch_only: bool,

    /// JSON file with the languages supported by the runner, replacing the built-in list
    #[clap(long)]
    pub languages: Option<PathBuf>,

    /// Kill the runner if a single execution takes longer than this many seconds
    #[clap(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Print the outcome of the evaluation as JSON
    #[clap(long)]
    pub json: bool,

    #[clap(flatten)]
    pub logger: LoggerOpt,
}

#[derive(Args, Debug, Clone)]
pub struct LoggerOpt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a strictly positive number of seconds that fits in a `Duration`.
fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|e| format!("invalid number of seconds: {e}"))?;
    if secs.is_nan() || secs <= 0.0 {
        return Err(format!("the timeout must be positive, got {value}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout {value}: {e}"))
}

impl LoggerOpt {
    pub fn enable_log(&self) {
        if self.verbose > 0 {
            std::env::set_var("RUST_BACKTRACE", "1");
            match self.verbose {
                0 => unreachable!(),
                1 => std::env::set_var("RUST_LOG", "info"),
                2 => std::env::set_var("RUST_LOG", "debug"),
                _ => std::env::set_var("RUST_LOG", "trace"),
            }
        }

        env_logger::Builder::from_default_env()
            .format_timestamp_nanos()
            .init();
        better_panic::install();
    }
}

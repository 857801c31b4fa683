use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::time::Duration;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommands {
    /// Run the control core against a randomly fluctuating simulated pack
    Simulate {
        /// Number of cycles to run, runs forever if omitted
        #[arg(long, short)]
        cycles: Option<u64>,
        /// Seed for the simulated sensors, random if omitted
        #[arg(long, short)]
        seed: Option<u64>,
        /// Run the start-up sequence before the first cycle
        #[arg(long, action)]
        initialize: bool,
    },
    /// Replay a scripted sequence of readings from a YAML file
    Scenario {
        /// Path to the scenario file
        file: String,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    /// One status line per cycle
    Console,
    /// One JSON object per cycle
    Json,
}

const fn about_text() -> &'static str {
    "ev battery management core simulator"
}

#[derive(Parser, Debug)]
#[command(version, about=about_text(), long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    pub command: CliCommands,

    /// Time between control cycles (e.g., "100ms", "1s", "0s" to run flat out)
    #[arg(value_parser = humantime::parse_duration, long, default_value = "100ms")]
    pub interval: Duration,

    /// Format of the per-cycle status output
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,
}

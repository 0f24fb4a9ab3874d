use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "council-node")]
#[command(about = "Single-round council leader election over TCP with injectable faults")]
pub struct Cli {
    /// JSON config; defaults are used when the file does not exist
    #[arg(long, global = true, value_name = "FILE", default_value = "council.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start every node and play one scenario
    Run {
        #[arg(short, long, value_name = "N")]
        scenario: u8,

        /// Override how long the election is observed before exiting
        #[arg(long, value_name = "SECS")]
        run_for: Option<u64>,
    },
    /// List the built-in scenarios
    List,
    /// Write the default config to disk
    InitConfig {
        #[arg(short, long, value_name = "OUT", default_value = "council.json")]
        out: PathBuf,
    },
}

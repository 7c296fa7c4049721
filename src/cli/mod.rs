pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SinkKind;
use crate::crawler::{DEFAULT_AMOUNT, DEFAULT_WORKERS};

#[derive(Parser)]
#[command(name = "scrollharvest")]
#[command(about = "Harvest entries from an infinite-scroll feed", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/scrollharvest/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest entries and submit them to the sink
    Run {
        /// Number of posts to be parsed
        #[arg(short, long, default_value_t = DEFAULT_AMOUNT)]
        posts: usize,

        /// Posts offset into the feed
        #[arg(short, long, default_value_t = 0)]
        offset: usize,

        /// Number of posts parsed at the same moment (values below 1 mean 1)
        #[arg(short, long, default_value_t = DEFAULT_WORKERS as i64, allow_negative_numbers = true)]
        workers: i64,

        /// Override the configured sink
        #[arg(long, value_enum)]
        sink: Option<SinkKind>,

        /// Override the storage service URL
        #[arg(long)]
        sink_url: Option<String>,

        /// Override the SQLite database path
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// List entries stored in the SQLite database
    List,
    /// Print the configuration file path
    Config,
}

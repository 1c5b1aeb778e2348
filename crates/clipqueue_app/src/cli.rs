use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clipqueue_engine::Resolution;
use engine_logging::LogDestination;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Parser)]
#[command(name = "clipqueue", version, about = "Search, deduplicate and download video clips")]
pub struct Cli {
    /// RON configuration file. Defaults are used when the default file is absent.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, value_name = "DEST")]
    pub log_destination: Option<LogTarget>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Config path and whether it was named on the command line.
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every query and add unseen, dissimilar results to the pending list.
    Populate {
        /// Replaces the configured queries; repeat for several.
        #[arg(short, long = "query", value_name = "QUERY")]
        queries: Vec<String>,

        #[arg(long, value_name = "N")]
        per_query: Option<usize>,
    },
    /// Download up to N pending videos.
    Download {
        #[arg(short = 'n', long, value_name = "N")]
        count: Option<usize>,
    },
    /// Download a single URL, bypassing the queue.
    FetchUrl {
        url: String,

        #[arg(long, default_value = "best")]
        resolution: Resolution,

        #[arg(long, default_value = "mp4")]
        container: String,

        /// Defaults to the configured videos directory.
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Print the sizes of the pending and downloaded lists.
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

mod cli;
mod commands;
mod config;
mod progress;

use clap::Parser;
use engine_logging::engine_info;
use log::LevelFilter;

use crate::cli::{Cli, Command};
use crate::commands::App;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config_path, explicit) = cli.config_path();
    let mut config = config::load(&config_path, explicit)?;

    if let Some(target) = cli.log_destination {
        config.log_destination = target.into();
    }
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.level_filter()?
    };
    if !engine_logging::initialize(config.log_destination, level, &config.log_file) {
        eprintln!("Warning: logging is disabled");
    }
    engine_info!(
        "clipqueue {} starting with config {:?} (found: {})",
        env!("CARGO_PKG_VERSION"),
        config_path,
        config_path.exists()
    );

    let app = App::new(config);
    match cli.command {
        Command::Populate { queries, per_query } => app.populate(queries, per_query),
        Command::Download { count } => app.download(count),
        Command::FetchUrl {
            url,
            resolution,
            container,
            output_dir,
        } => app.fetch_url(&url, resolution, &container, output_dir),
        Command::Status => app.status(),
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use clipqueue_core::DEFAULT_SIMILARITY_THRESHOLD;
use clipqueue_engine::YtDlpSettings;
use engine_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "clipqueue.ron";

const DEFAULT_QUERIES: &[&str] = &[
    "fight scene",
    "best fight scene",
    "epic fight scene",
    "action fight scene",
    "martial arts fight scene",
    "superhero fight scene",
    "samurai fight scene",
    "ninja fight scene",
    "kung fu fight scene",
    "movie fight scene",
    "best sci-fi fight scene",
    "epic spy fight scene",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub queries: Vec<String>,
    pub results_per_query: usize,
    pub max_downloads: usize,
    pub similarity_threshold: f64,
    /// Holds `search_results.json` and `downloaded_videos.json`.
    pub state_dir: PathBuf,
    pub videos_dir: PathBuf,
    pub ytdlp_binary: PathBuf,
    pub search_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let ytdlp = YtDlpSettings::default();
        Self {
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            results_per_query: 10,
            max_downloads: 1,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            state_dir: PathBuf::from("."),
            videos_dir: ytdlp.videos_dir,
            ytdlp_binary: ytdlp.binary,
            search_timeout_secs: ytdlp.search_timeout.as_secs(),
            download_timeout_secs: ytdlp.download_timeout.as_secs(),
            log_destination: LogDestination::File,
            log_file: PathBuf::from("clipqueue.log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .with_context(|| format!("invalid log_level '{}'", self.log_level))
    }

    pub fn ytdlp_settings(&self) -> YtDlpSettings {
        YtDlpSettings {
            binary: self.ytdlp_binary.clone(),
            videos_dir: self.videos_dir.clone(),
            search_timeout: Duration::from_secs(self.search_timeout_secs),
            download_timeout: Duration::from_secs(self.download_timeout_secs),
            ..YtDlpSettings::default()
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            bail!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            );
        }
        if self.results_per_query == 0 {
            bail!("results_per_query must be at least 1");
        }
        self.level_filter()?;
        Ok(())
    }
}

/// Reads the RON config at `path`.
///
/// A missing file yields the defaults unless the path was given explicitly.
pub fn load(path: &Path, explicit: bool) -> anyhow::Result<AppConfig> {
    let config = match fs::read_to_string(path) {
        Ok(text) => parse(&text).with_context(|| format!("reading config {}", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            AppConfig::default()
        }
        Err(err) => {
            return Err(err).with_context(|| format!("opening config {}", path.display()));
        }
    };
    Ok(config)
}

pub fn parse(text: &str) -> anyhow::Result<AppConfig> {
    let config: AppConfig = ron::from_str(text)?;
    config.validate()?;
    Ok(config)
}

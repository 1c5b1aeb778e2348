use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::str::FromStr;
use std::time::Duration;

use clipqueue_core::{DiscoveredVideo, Discoverer, Downloader, FailureKind, ToolError};
use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;
use tokio::runtime::Runtime;

use crate::filename::artifact_stem;
use crate::persist::ensure_output_dir;

const DEFAULT_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const QUEUE_CONTAINER: &str = "mp4";

#[derive(Debug, Clone)]
pub struct YtDlpSettings {
    pub binary: PathBuf,
    /// Destination of queue downloads.
    pub videos_dir: PathBuf,
    pub format: String,
    pub search_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            videos_dir: PathBuf::from("videos"),
            format: DEFAULT_FORMAT.to_string(),
            search_timeout: Duration::from_secs(120),
            download_timeout: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Quality cap for direct URL downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Best,
    P1080,
    P720,
    P360,
}

impl Resolution {
    pub fn format_selector(self) -> &'static str {
        match self {
            Resolution::Best => "bestvideo+bestaudio/best",
            Resolution::P1080 => "bestvideo[height<=1080]+bestaudio/best",
            Resolution::P720 => "bestvideo[height<=720]+bestaudio/best",
            Resolution::P360 => "bestvideo[height<=360]+bestaudio/best",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Best => write!(f, "best"),
            Resolution::P1080 => write!(f, "1080p"),
            Resolution::P720 => write!(f, "720p"),
            Resolution::P360 => write!(f, "360p"),
        }
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(Resolution::Best),
            "1080p" | "1080" => Ok(Resolution::P1080),
            "720p" | "720" => Ok(Resolution::P720),
            "360p" | "360" => Ok(Resolution::P360),
            other => Err(format!("unknown resolution '{other}'")),
        }
    }
}

/// Search and download through the `yt-dlp` command line tool.
///
/// Calls block the caller; each child process runs on a private
/// current-thread runtime and is killed when its timeout expires.
pub struct YtDlp {
    settings: YtDlpSettings,
    runtime: Runtime,
}

impl YtDlp {
    pub fn new(settings: YtDlpSettings) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { settings, runtime })
    }

    pub fn settings(&self) -> &YtDlpSettings {
        &self.settings
    }

    fn run(&self, args: Vec<OsString>, timeout: Duration) -> Result<Output, ToolError> {
        engine_debug!("{} {:?}", self.settings.binary.display(), args);
        self.runtime
            .block_on(run_tool(&self.settings.binary, &args, timeout))
    }

    /// Fetches a single URL outside the queue, named after the platform title.
    ///
    /// The artifact ends up as `{output_dir}/{title}.{container}`; a file
    /// produced with another extension is renamed accordingly.
    pub fn download_from_url(
        &self,
        url: &str,
        resolution: Resolution,
        container: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, ToolError> {
        let container = match container.trim_start_matches('.') {
            "" => QUEUE_CONTAINER,
            other => other,
        };
        ensure_output_dir(output_dir)
            .map_err(|err| ToolError::new(FailureKind::Io, err.to_string()))?;

        let args: Vec<OsString> = vec![
            "-f".into(),
            resolution.format_selector().into(),
            "--merge-output-format".into(),
            container.into(),
            "-o".into(),
            output_dir.join("%(title)s.%(ext)s").into_os_string(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--print".into(),
            "after_move:filepath".into(),
            "--".into(),
            url.into(),
        ];
        let output = self.run(args, self.settings.download_timeout)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let produced = last_line(&stdout).map(PathBuf::from).ok_or_else(|| {
            ToolError::new(FailureKind::InvalidOutput, "yt-dlp did not print the file path")
        })?;
        if !produced.exists() {
            return Err(ToolError::new(
                FailureKind::MissingArtifact,
                format!("{} not found after download", produced.display()),
            ));
        }

        let wanted = produced.with_extension(container);
        if wanted != produced {
            fs::rename(&produced, &wanted)
                .map_err(|err| ToolError::new(FailureKind::Io, err.to_string()))?;
        }
        engine_info!(
            "Downloaded {} to {:?} (resolution: {}, container: {})",
            url,
            wanted,
            resolution,
            container
        );
        Ok(wanted)
    }
}

impl Discoverer for YtDlp {
    fn discover(&self, query: &str, limit: usize) -> Result<Vec<DiscoveredVideo>, ToolError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let output = self.run(search_args(query, limit), self.settings.search_timeout)?;
        let hits = parse_search_output(&String::from_utf8_lossy(&output.stdout), limit);
        engine_info!("Search '{}' returned {} results", query, hits.len());
        Ok(hits)
    }
}

impl Downloader for YtDlp {
    fn download(&self, url: &str, title: &str) -> Result<PathBuf, ToolError> {
        let dir = &self.settings.videos_dir;
        ensure_output_dir(dir).map_err(|err| ToolError::new(FailureKind::Io, err.to_string()))?;

        let stem = artifact_stem(title, url);
        let expected = dir.join(format!("{stem}.{QUEUE_CONTAINER}"));
        let args: Vec<OsString> = vec![
            "-f".into(),
            self.settings.format.clone().into(),
            "--merge-output-format".into(),
            QUEUE_CONTAINER.into(),
            "-o".into(),
            dir.join(format!("{stem}.%(ext)s")).into_os_string(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--quiet".into(),
            "--".into(),
            url.into(),
        ];
        self.run(args, self.settings.download_timeout)?;

        if !expected.exists() {
            return Err(ToolError::new(
                FailureKind::MissingArtifact,
                format!("video file not found for {title}"),
            ));
        }
        engine_info!("Downloaded {} to {:?}", url, expected);
        Ok(expected)
    }
}

/// Arguments for a flat (metadata only) search returning one JSON object per line.
pub fn search_args(query: &str, limit: usize) -> Vec<OsString> {
    vec![
        "--flat-playlist".into(),
        "--dump-json".into(),
        "--no-warnings".into(),
        "--playlist-end".into(),
        limit.to_string().into(),
        format!("ytsearch{limit}:{query}").into(),
    ]
}

/// Extracts `{title, url}` pairs from `--dump-json` output.
///
/// Lines that are not JSON objects, or entries lacking a title or any way to
/// build a url, are skipped.
pub fn parse_search_output(stdout: &str, limit: usize) -> Vec<DiscoveredVideo> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<serde_json::Value>(line) {
            Ok(entry) => search_entry(&entry),
            Err(err) => {
                engine_warn!("Skipping unparsable search line: {}", err);
                None
            }
        })
        .take(limit)
        .collect()
}

fn search_entry(entry: &serde_json::Value) -> Option<DiscoveredVideo> {
    let title = entry.get("title").and_then(|v| v.as_str())?;
    let url = entry
        .get("url")
        .and_then(|v| v.as_str())
        .filter(|url| !url.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| {
            entry
                .get("id")
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty())
                .map(|id| format!("https://www.youtube.com/watch?v={id}"))
        })?;
    Some(DiscoveredVideo::new(title, url))
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|line| !line.is_empty())
}

async fn run_tool(
    binary: &Path,
    args: &[OsString],
    timeout: Duration,
) -> Result<Output, ToolError> {
    let child = tokio::process::Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| {
            ToolError::new(FailureKind::Spawn, format!("{}: {err}", binary.display()))
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|err| ToolError::new(FailureKind::Io, err.to_string()))?,
        Err(_) => {
            return Err(ToolError::new(
                FailureKind::Timeout,
                format!("no result after {}s", timeout.as_secs()),
            ))
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = last_line(&stderr).unwrap_or("no error output").to_string();
        return Err(ToolError::new(
            FailureKind::ExitStatus(output.status.code()),
            message,
        ));
    }
    Ok(output)
}

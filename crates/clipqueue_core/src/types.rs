use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One discovered or downloaded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub title: String,
    pub url: String,
    /// Local artifact, set once the video has been downloaded.
    pub path: Option<PathBuf>,
}

impl VideoRecord {
    pub fn pending(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            path: None,
        }
    }

    pub fn downloaded(title: impl Into<String>, url: impl Into<String>, path: PathBuf) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            path: Some(path),
        }
    }
}

/// A search hit as reported by the discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredVideo {
    pub title: String,
    pub url: String,
}

impl DiscoveredVideo {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

impl From<DiscoveredVideo> for VideoRecord {
    fn from(video: DiscoveredVideo) -> Self {
        VideoRecord::pending(video.title, video.url)
    }
}

/// A video fetched during a consume batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedVideo {
    pub path: PathBuf,
    /// Sanitized title, as stored in the downloaded list.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: FailureKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Spawn,
    Io,
    ExitStatus(Option<i32>),
    Timeout,
    MissingArtifact,
    InvalidOutput,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Spawn => write!(f, "could not start external tool"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::ExitStatus(Some(code)) => write!(f, "external tool exited with {code}"),
            FailureKind::ExitStatus(None) => write!(f, "external tool killed by signal"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::MissingArtifact => write!(f, "output file not found"),
            FailureKind::InvalidOutput => write!(f, "unreadable tool output"),
        }
    }
}

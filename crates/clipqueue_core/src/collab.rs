use std::path::PathBuf;

use crate::{DiscoveredVideo, ToolError};

/// External search capability.
pub trait Discoverer {
    /// Returns up to `limit` hits for `query`, in platform ranking order.
    fn discover(&self, query: &str, limit: usize) -> Result<Vec<DiscoveredVideo>, ToolError>;
}

/// External fetch capability.
pub trait Downloader {
    /// Stores the media behind `url` under a name derived from `title` and
    /// returns the final artifact path.
    fn download(&self, url: &str, title: &str) -> Result<PathBuf, ToolError>;
}

impl<F> Discoverer for F
where
    F: Fn(&str, usize) -> Result<Vec<DiscoveredVideo>, ToolError>,
{
    fn discover(&self, query: &str, limit: usize) -> Result<Vec<DiscoveredVideo>, ToolError> {
        self(query, limit)
    }
}

impl<F> Downloader for F
where
    F: Fn(&str, &str) -> Result<PathBuf, ToolError>,
{
    fn download(&self, url: &str, title: &str) -> Result<PathBuf, ToolError> {
        self(url, title)
    }
}

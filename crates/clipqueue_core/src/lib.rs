//! Clipqueue core: search-result deduplication and download-queue management.
//!
//! Everything here is free of IO; persistence, search and download are
//! injected through the [`ListStore`], [`Discoverer`] and [`Downloader`] seams.
mod collab;
mod progress;
mod queue;
mod similarity;
mod store;
mod title;
mod types;

pub use collab::{Discoverer, Downloader};
pub use progress::{ChannelProgressSink, NullProgress, ProgressEvent, ProgressSink};
pub use queue::{ConsumeReport, QueueError, QueueManager, QueueSettings};
pub use similarity::{is_similar, TitleIndex, DEFAULT_SIMILARITY_THRESHOLD};
pub use store::{validate_record, ListKey, ListStore, MemoryListStore, StoreError};
pub use title::sanitize_title;
pub use types::{DiscoveredVideo, DownloadedVideo, FailureKind, ToolError, VideoRecord};

//! Clipqueue engine: filesystem persistence and the yt-dlp collaborator.
mod filename;
mod persist;
mod store;
mod ytdlp;

pub use filename::artifact_stem;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use store::{JsonListStore, DOWNLOADED_FILENAME, PENDING_FILENAME};
pub use ytdlp::{
    parse_search_output, search_args, EngineError, Resolution, YtDlp, YtDlpSettings,
};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use {} for state or videos: {reason}", dir.display())]
    Unusable { dir: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<PersistError> for io::Error {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Io(inner) => inner,
            unusable @ PersistError::Unusable { .. } => io::Error::other(unusable.to_string()),
        }
    }
}

/// Creates `dir` (and parents) when absent and proves it accepts new files.
///
/// A regular file at `dir` is rejected by `create_dir_all` itself.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::Unusable {
        dir: dir.to_path_buf(),
        reason,
    };
    fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))?;
    // Unnamed probe; the OS reclaims it when the handle drops.
    tempfile::tempfile_in(dir).map_err(|err| unusable(format!("not writable: {err}")))?;
    Ok(())
}

/// Replaces `{dir}/{filename}` in one step: the bytes go to a synced temp file
/// in the same directory which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::similarity::{TitleIndex, DEFAULT_SIMILARITY_THRESHOLD};
use crate::title::sanitize_title;
use crate::{
    Discoverer, DownloadedVideo, Downloader, FailureKind, ListKey, ListStore, ProgressSink,
    StoreError, ToolError, VideoRecord,
};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub similarity_threshold: f64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Outcome of one consume batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumeReport {
    pub downloaded: Vec<DownloadedVideo>,
    /// Pending entries dropped because they were already downloaded.
    pub pruned: usize,
    /// Download attempts that failed; those entries stay pending.
    pub failed: usize,
}

impl ConsumeReport {
    pub fn succeeded(&self) -> bool {
        !self.downloaded.is_empty()
    }

    pub fn into_parts(self) -> (bool, Vec<(PathBuf, String)>) {
        let succeeded = self.succeeded();
        let pairs = self
            .downloaded
            .into_iter()
            .map(|video| (video.path, video.title))
            .collect();
        (succeeded, pairs)
    }
}

/// Url and title lookups over a set of records, grown as records are added.
#[derive(Debug, Default)]
struct KnownVideos {
    urls: HashSet<String>,
    titles: TitleIndex,
}

impl KnownVideos {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a VideoRecord>) -> Self {
        let mut known = Self::default();
        for record in records {
            known.add(&record.url, &record.title);
        }
        known
    }

    fn add(&mut self, url: &str, title: &str) {
        self.urls.insert(url.to_string());
        self.titles.insert(title);
    }

    fn has_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    fn has_similar_title(&self, title: &str, threshold: f64) -> bool {
        self.titles.is_similar(title, threshold)
    }
}

/// Drives the search-dedup and download-queue workflows over a [`ListStore`].
pub struct QueueManager<S: ListStore> {
    store: S,
    settings: QueueSettings,
    cancel: Option<Arc<AtomicBool>>,
}

impl<S: ListStore> QueueManager<S> {
    pub fn new(store: S, settings: QueueSettings) -> Self {
        Self {
            store,
            settings,
            cancel: None,
        }
    }

    /// Checked between queries and between downloads; once set, the running
    /// operation stops early and persists what it has.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending(&self) -> Result<Vec<VideoRecord>, QueueError> {
        Ok(self.store.load(ListKey::Pending)?)
    }

    pub fn downloaded(&self) -> Result<Vec<VideoRecord>, QueueError> {
        Ok(self.store.load(ListKey::Downloaded)?)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Searches every query and appends hits that are neither known by url nor
    /// similar by title to anything pending or downloaded. Returns whether any
    /// record was added; the pending list is written only in that case.
    pub fn populate<D, P>(
        &self,
        queries: &[String],
        results_per_query: usize,
        discoverer: &D,
        sink: &P,
    ) -> Result<bool, QueueError>
    where
        D: Discoverer + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let downloaded = self.store.load(ListKey::Downloaded)?;
        let mut pending = self.store.load(ListKey::Pending)?;
        let threshold = self.settings.similarity_threshold;

        let known_downloaded = KnownVideos::from_records(&downloaded);
        let mut known_pending = KnownVideos::from_records(&pending);

        let total_queries = queries.len();
        let mut total_added = 0usize;

        for (idx, query) in queries.iter().enumerate() {
            if self.is_cancelled() {
                sink.status("Search cancelled.");
                break;
            }
            let position = idx + 1;
            sink.status(&format!(
                "Searching for '{query}' ({position}/{total_queries})..."
            ));

            let candidates = match discoverer.discover(query, results_per_query) {
                Ok(found) => found,
                Err(err) => {
                    sink.status(&format!("Error searching for '{query}': {err}"));
                    Vec::new()
                }
            };
            if candidates.is_empty() {
                sink.status(&format!("No search results found for '{query}'."));
                sink.percent(position as f64 / total_queries as f64 * 100.0);
                continue;
            }

            let mut added_for_query = 0usize;
            for candidate in candidates.into_iter().take(results_per_query) {
                if url::Url::parse(&candidate.url).is_err() {
                    sink.status(&format!(
                        "Excluding (invalid url {:?}): {}",
                        candidate.url, candidate.title
                    ));
                    continue;
                }
                let duplicate = known_downloaded.has_url(&candidate.url)
                    || known_pending.has_url(&candidate.url)
                    || known_downloaded.has_similar_title(&candidate.title, threshold)
                    || known_pending.has_similar_title(&candidate.title, threshold);
                if duplicate {
                    sink.status(&format!(
                        "Excluding (already exists or similar): {}",
                        candidate.title
                    ));
                    continue;
                }
                known_pending.add(&candidate.url, &candidate.title);
                pending.push(candidate.into());
                added_for_query += 1;
            }

            if added_for_query > 0 {
                total_added += added_for_query;
                sink.status(&format!(
                    "Added {added_for_query} unique videos for '{query}'."
                ));
            }
            sink.percent(position as f64 / total_queries as f64 * 100.0);
        }

        if total_added == 0 {
            sink.status("No new unique videos found in search results.");
            return Ok(false);
        }

        self.store.save(ListKey::Pending, &pending)?;
        sink.status(&format!(
            "Total: Added {total_added} unique videos to search results."
        ));
        Ok(true)
    }

    /// Downloads up to `max_downloads` pending entries in queue order.
    ///
    /// Successful entries move to the downloaded list; failed ones stay pending
    /// for a later run; entries already downloaded (by url or similar title)
    /// are pruned. Both lists are written once after the scan, downloaded first.
    pub fn consume<D, P>(
        &self,
        max_downloads: usize,
        downloader: &D,
        sink: &P,
    ) -> Result<ConsumeReport, QueueError>
    where
        D: Downloader + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mut pending = self.store.load(ListKey::Pending)?;
        let mut downloaded = self.store.load(ListKey::Downloaded)?;
        let mut report = ConsumeReport::default();

        if pending.is_empty() {
            sink.status("Search results list is empty. Please populate it first.");
            return Ok(report);
        }
        if max_downloads == 0 {
            return Ok(report);
        }

        let threshold = self.settings.similarity_threshold;
        let mut known = KnownVideos::from_records(&downloaded);

        let mut cursor = 0usize;
        while cursor < pending.len() && report.downloaded.len() < max_downloads {
            if self.is_cancelled() {
                sink.status("Download batch cancelled.");
                break;
            }

            let entry = &pending[cursor];
            if known.has_url(&entry.url) {
                sink.status(&format!("Skipping (already downloaded): {}", entry.title));
                pending.remove(cursor);
                report.pruned += 1;
                continue;
            }
            if known.has_similar_title(&entry.title, threshold) {
                sink.status(&format!("Skipping (similar title): {}", entry.title));
                pending.remove(cursor);
                report.pruned += 1;
                continue;
            }

            let title = sanitize_title(&entry.title);
            let url = entry.url.clone();
            let outcome = downloader.download(&url, &title).and_then(|path| {
                if path.as_os_str().is_empty() {
                    Err(ToolError::new(
                        FailureKind::MissingArtifact,
                        "downloader reported an empty path",
                    ))
                } else {
                    Ok(path)
                }
            });
            match outcome {
                Ok(path) => {
                    sink.status(&format!("Downloaded: {title}"));
                    known.add(&url, &title);
                    downloaded.push(VideoRecord::downloaded(
                        title.clone(),
                        url,
                        path.clone(),
                    ));
                    report.downloaded.push(DownloadedVideo { path, title });
                    pending.remove(cursor);
                    let done = report.downloaded.len();
                    sink.percent(done as f64 / max_downloads as f64 * 100.0);
                }
                Err(err) => {
                    sink.status(&format!("Error downloading {title}: {err}"));
                    report.failed += 1;
                    cursor += 1;
                }
            }
        }

        // Downloaded first: if the pending write then fails, the entry is
        // still pending and the next batch prunes it by url.
        self.store.save(ListKey::Downloaded, &downloaded)?;
        self.store.save(ListKey::Pending, &pending)?;
        Ok(report)
    }
}

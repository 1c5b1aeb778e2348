use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clipqueue_core::{QueueManager, QueueSettings};
use clipqueue_engine::{JsonListStore, Resolution, YtDlp};
use engine_logging::{engine_info, engine_warn};

use crate::config::AppConfig;
use crate::progress::ConsoleProgress;

pub struct App {
    config: AppConfig,
    queue: QueueManager<JsonListStore>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let store = JsonListStore::new(config.state_dir.clone());
        let settings = QueueSettings {
            similarity_threshold: config.similarity_threshold,
        };
        Self {
            queue: QueueManager::new(store, settings).with_cancel_flag(interrupt_flag()),
            config,
        }
    }

    fn ytdlp(&self) -> anyhow::Result<YtDlp> {
        YtDlp::new(self.config.ytdlp_settings()).context("preparing yt-dlp runner")
    }

    /// Empty `queries` falls back to the configured ones.
    pub fn populate(&self, queries: Vec<String>, per_query: Option<usize>) -> anyhow::Result<()> {
        let queries = if queries.is_empty() {
            self.config.queries.clone()
        } else {
            queries
        };
        let per_query = per_query.unwrap_or(self.config.results_per_query);
        engine_info!(
            "Populating from {} queries, {} results each",
            queries.len(),
            per_query
        );

        let ytdlp = self.ytdlp()?;
        let added = self
            .queue
            .populate(&queries, per_query, &ytdlp, &ConsoleProgress::new())?;
        if !added {
            engine_info!("Pending list unchanged");
        }
        Ok(())
    }

    pub fn download(&self, count: Option<usize>) -> anyhow::Result<()> {
        let count = count.unwrap_or(self.config.max_downloads);
        let ytdlp = self.ytdlp()?;
        let report = self.queue.consume(count, &ytdlp, &ConsoleProgress::new())?;

        if report.pruned > 0 {
            println!("Pruned {} already downloaded entries.", report.pruned);
        }
        if report.failed > 0 {
            engine_warn!("{} downloads failed and stay pending", report.failed);
        }
        let (succeeded, videos) = report.into_parts();
        if !succeeded {
            println!("No videos downloaded.");
        }
        for (path, title) in videos {
            println!("{title} -> {}", path.display());
        }
        Ok(())
    }

    pub fn fetch_url(
        &self,
        url: &str,
        resolution: Resolution,
        container: &str,
        output_dir: Option<PathBuf>,
    ) -> anyhow::Result<()> {
        let output_dir = output_dir.unwrap_or_else(|| self.config.videos_dir.clone());
        let path = self
            .ytdlp()?
            .download_from_url(url, resolution, container, &output_dir)
            .with_context(|| format!("downloading {url}"))?;
        println!("Downloaded to {}", path.display());
        Ok(())
    }

    pub fn status(&self) -> anyhow::Result<()> {
        let pending = self.queue.pending()?;
        let downloaded = self.queue.downloaded()?;
        println!("State directory: {}", self.queue.store().dir().display());
        println!("Pending results:   {}", pending.len());
        println!("Downloaded videos: {}", downloaded.len());
        Ok(())
    }
}

/// Raised by the first Ctrl+C so the running batch stops after the current
/// item and still saves its lists. A second Ctrl+C exits immediately.
fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    let spawned = thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_warn!("Ctrl+C handling unavailable: {}", err);
                    return;
                }
            };
            runtime.block_on(async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    engine_warn!("Failed to install Ctrl+C handler: {}", err);
                    return;
                }
                eprintln!("Interrupted; finishing the current item...");
                raised.store(true, Ordering::Relaxed);
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(130);
                }
            });
        });
    if let Err(err) = spawned {
        engine_warn!("Ctrl+C handling unavailable: {}", err);
    }
    flag
}

//! Drives a whole run: scrape the shared link, then download every video

use crate::browser::{BrowserSession, ScrapeSettings};
use crate::core::job::ShareJob;
use crate::core::VideoReference;
use crate::download::DownloadAgent;
use crate::error::GrabError;
use crate::pages;
use crate::utils::{unique_stems, with_extension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Run options
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Output file extension
    pub extension: String,
    /// Log failed downloads and continue instead of aborting
    pub keep_going: bool,
    pub scrape: ScrapeSettings,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            extension: "mp4".to_string(),
            keep_going: false,
            scrape: ScrapeSettings::default(),
        }
    }
}

/// Something that happened during a run, reported in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Scraping finished with `count` videos
    Discovered { count: usize },
    /// The file already exists, nothing fetched
    Skipped { index: usize, total: usize, path: PathBuf },
    Started { index: usize, total: usize, title: String, path: PathBuf },
    Finished { index: usize, total: usize, path: PathBuf },
    Failed { index: usize, total: usize, title: String, reason: String },
}

/// Outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub downloaded: usize,
    pub skipped: usize,
    /// Titles and reasons of failed downloads (only with `keep_going`)
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Scrapes a shared link and feeds every video to a download agent
pub struct Orchestrator<A: DownloadAgent> {
    agent: A,
    options: RunOptions,
    on_event: Option<Arc<dyn Fn(RunEvent) + Send + Sync>>,
}

impl<A: DownloadAgent> Orchestrator<A> {
    pub fn new(agent: A) -> Self {
        Self::with_options(agent, RunOptions::default())
    }

    pub fn with_options(agent: A, options: RunOptions) -> Self {
        Self {
            agent,
            options,
            on_event: None,
        }
    }

    /// Set event callback
    pub fn with_events<F>(mut self, callback: F) -> Self
    where
        F: Fn(RunEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(callback));
        self
    }

    fn emit(&self, event: RunEvent) {
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }

    /// Scrape settings for `job`, with its selector overrides applied
    fn scrape_settings(&self, job: &ShareJob) -> ScrapeSettings {
        match &job.selectors {
            Some(selectors) => self.options.scrape.clone().with_selectors(selectors.clone()),
            None => self.options.scrape.clone(),
        }
    }

    /// Collect every video reference; the session is closed before returning
    pub async fn collect<S: BrowserSession>(
        &self,
        session: S,
        job: &ShareJob,
    ) -> Result<Vec<VideoReference>, GrabError> {
        let settings = self.scrape_settings(job);
        let videos = pages::scrape(session, &job.url, job.password(), &settings).await?;
        self.emit(RunEvent::Discovered {
            count: videos.len(),
        });
        Ok(videos)
    }

    /// Full run: prepare `destination`, scrape, then download in order
    pub async fn run<S: BrowserSession>(
        &self,
        session: S,
        job: &ShareJob,
        destination: &Path,
    ) -> Result<RunSummary, GrabError> {
        tokio::fs::create_dir_all(destination).await?;
        let videos = self.collect(session, job).await?;
        self.download_all(&videos, destination).await
    }

    /// Download `videos` one after another into `destination`.
    ///
    /// Existing files are taken as already downloaded and skipped.
    pub async fn download_all(
        &self,
        videos: &[VideoReference],
        destination: &Path,
    ) -> Result<RunSummary, GrabError> {
        tokio::fs::create_dir_all(destination).await?;

        let total = videos.len();
        let mut summary = RunSummary {
            discovered: total,
            ..Default::default()
        };
        let stems = unique_stems(videos.iter().map(|v| v.title.as_str()));

        for (index, (video, stem)) in videos.iter().zip(stems).enumerate() {
            let path = destination.join(with_extension(&stem, &self.options.extension));

            if tokio::fs::try_exists(&path).await? {
                info!("Skipping '{}', {} already exists", video.title, path.display());
                summary.skipped += 1;
                self.emit(RunEvent::Skipped { index, total, path });
                continue;
            }

            info!("[{}/{}] Downloading '{}'", index + 1, total, video.title);
            self.emit(RunEvent::Started {
                index,
                total,
                title: video.title.clone(),
                path: path.clone(),
            });

            match self.agent.fetch(&video.media_url, &path).await {
                Ok(()) => {
                    summary.downloaded += 1;
                    self.emit(RunEvent::Finished { index, total, path });
                }
                Err(e) if self.options.keep_going => {
                    error!("Download of '{}' failed: {}", video.title, e);
                    self.emit(RunEvent::Failed {
                        index,
                        total,
                        title: video.title.clone(),
                        reason: e.to_string(),
                    });
                    summary.failed.push((video.title.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Done: {} downloaded, {} skipped, {} failed",
            summary.downloaded,
            summary.skipped,
            summary.failed.len()
        );
        Ok(summary)
    }
}

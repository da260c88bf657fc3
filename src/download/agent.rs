//! Download agent abstraction and URL-based routing

use crate::download::{HlsAgent, HttpAgent};
use crate::error::GrabError;
use crate::utils::is_hls_url;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Fetches one media URL into a file, returning once the file is complete
#[async_trait]
pub trait DownloadAgent: Send + Sync {
    /// Download `media_url` to `destination`.
    ///
    /// On error no file is left at `destination`.
    async fn fetch(&self, media_url: &str, destination: &Path) -> Result<(), GrabError>;
}

#[async_trait]
impl<T: DownloadAgent + ?Sized> DownloadAgent for Box<T> {
    async fn fetch(&self, media_url: &str, destination: &Path) -> Result<(), GrabError> {
        (**self).fetch(media_url, destination).await
    }
}

/// Which agent handles media URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentKind {
    /// HLS playlists through ffmpeg, everything else over HTTP
    #[default]
    Auto,
    /// Always ffmpeg
    Hls,
    /// Always plain HTTP
    Http,
}

/// Routes HLS playlists to ffmpeg and plain files to HTTP.
///
/// A URL that does not look like a playlist but answers with a playlist
/// content type is retried through ffmpeg.
pub struct AutoAgent {
    hls: HlsAgent,
    http: HttpAgent,
}

impl AutoAgent {
    pub fn new(hls: HlsAgent, http: HttpAgent) -> Self {
        Self { hls, http }
    }
}

#[async_trait]
impl DownloadAgent for AutoAgent {
    async fn fetch(&self, media_url: &str, destination: &Path) -> Result<(), GrabError> {
        if is_hls_url(media_url) {
            return self.hls.fetch(media_url, destination).await;
        }

        match self.http.fetch(media_url, destination).await {
            Err(GrabError::UnexpectedPlaylist(_)) => {
                info!("{} is a playlist, handing it to ffmpeg", media_url);
                self.hls.fetch(media_url, destination).await
            }
            other => other,
        }
    }
}

/// Build the agent selected by `kind`
pub fn build_agent(kind: AgentKind, hls: HlsAgent, http: HttpAgent) -> Box<dyn DownloadAgent> {
    match kind {
        AgentKind::Auto => Box::new(AutoAgent::new(hls, http)),
        AgentKind::Hls => Box::new(hls),
        AgentKind::Http => Box::new(http),
    }
}

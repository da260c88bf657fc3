//! Streaming HTTP download of direct media files

use crate::core::progress::Progress;
use crate::download::DownloadAgent;
use crate::error::GrabError;
use crate::utils::{is_hls_content_type, partial_path};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// HTTP agent configuration
#[derive(Clone)]
pub struct HttpAgentConfig {
    /// Timeout for establishing the connection
    pub connect_timeout: Duration,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    /// Delay before the first retry, doubled after each attempt
    pub retry_delay: Duration,
    /// Rate limit in bytes per second
    pub rate_limit_bps: Option<u64>,
    pub user_agent: String,
    /// Progress callback
    pub progress_callback: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

impl Default for HttpAgentConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(200),
            rate_limit_bps: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

/// Keeps the average write speed under a byte budget
struct RateLimiter {
    bytes_per_second: u64,
    started: Instant,
    bytes_sent: u64,
}

impl RateLimiter {
    fn new(bytes_per_second: u64) -> Self {
        Self {
            bytes_per_second: bytes_per_second.max(1),
            started: Instant::now(),
            bytes_sent: 0,
        }
    }

    async fn wait_if_needed(&mut self, bytes: u64) {
        self.bytes_sent += bytes;
        let allowed = Duration::from_secs_f64(self.bytes_sent as f64 / self.bytes_per_second as f64);
        let elapsed = self.started.elapsed();

        if allowed > elapsed + Duration::from_millis(1) {
            tokio::time::sleep(allowed - elapsed).await;
        }
    }
}

/// Downloads direct media URLs with a single streaming GET
pub struct HttpAgent {
    client: reqwest::Client,
    config: HttpAgentConfig,
}

impl HttpAgent {
    /// Create an agent with default settings
    pub fn new() -> Result<Self, GrabError> {
        Self::with_config(HttpAgentConfig::default())
    }

    /// Create an agent with configuration
    pub fn with_config(config: HttpAgentConfig) -> Result<Self, GrabError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Set progress callback
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.config.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Set max retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set delay before the first retry
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// One GET into `partial`, returning the number of bytes written
    async fn fetch_once(&self, url: &str, partial: &Path) -> Result<u64, GrabError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let is_playlist = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, is_hls_content_type);
        if is_playlist {
            return Err(GrabError::UnexpectedPlaylist(url.to_string()));
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut progress = Progress::new(total_size);
        let mut limiter = self.config.rate_limit_bps.map(RateLimiter::new);
        let mut file = File::create(partial).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            progress.update(downloaded);
            if let Some(callback) = &self.config.progress_callback {
                callback(progress.clone());
            }
            if let Some(limiter) = limiter.as_mut() {
                limiter.wait_if_needed(chunk.len() as u64).await;
            }
        }

        file.flush().await?;
        file.sync_all().await?;

        if downloaded == 0 {
            return Err(GrabError::DownloadFailed(format!("{} returned an empty body", url)));
        }
        if total_size > 0 && downloaded < total_size {
            return Err(GrabError::DownloadFailed(format!(
                "{} ended after {} of {} bytes",
                url, downloaded, total_size
            )));
        }

        Ok(downloaded)
    }
}

#[async_trait]
impl DownloadAgent for HttpAgent {
    async fn fetch(&self, media_url: &str, destination: &Path) -> Result<(), GrabError> {
        info!("Downloading {} to {}", media_url, destination.display());
        let partial = partial_path(destination);
        let mut delay = self.config.retry_delay;
        let mut attempt = 0;

        loop {
            match self.fetch_once(media_url, &partial).await {
                Ok(bytes) => {
                    tokio::fs::rename(&partial, destination).await?;
                    debug!("Wrote {} bytes to {}", bytes, destination.display());
                    return Ok(());
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&partial).await;
                    if !e.is_retryable() || attempt >= self.config.max_retries {
                        return Err(e);
                    }
                    attempt += 1;
                    warn!(
                        "Attempt {} for {} failed: {}, retrying in {:?}",
                        attempt, media_url, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn test_agent() -> HttpAgent {
        HttpAgent::new()
            .unwrap()
            .with_retry_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_http_agent_config_default() {
        let config = HttpAgentConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(config.rate_limit_bps.is_none());
        assert!(config.progress_callback.is_none());
        assert!(config.user_agent.starts_with("sharegrab/"));
    }

    #[tokio::test]
    async fn test_fetch_writes_destination() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/w1.mp4")
            .with_status(200)
            .with_header("content-type", "video/mp4")
            .with_body("fake video bytes")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Week 1.mp4");

        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = seen.clone();
        let agent = test_agent().with_progress_callback(move |p: Progress| {
            seen_clone.store(p.downloaded_size, Ordering::SeqCst);
        });

        agent
            .fetch(&format!("{}/w1.mp4", server.url()), &dest)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "fake video bytes");
        assert!(!partial_path(&dest).exists());
        assert_eq!(seen.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn test_not_found_leaves_no_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gone.mp4")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gone.mp4");

        let result = test_agent()
            .fetch(&format!("{}/gone.mp4", server.url()), &dest)
            .await;

        assert!(matches!(result, Err(GrabError::Http(_))));
        mock.assert_async().await;
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky.mp4")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("flaky.mp4");

        let result = test_agent()
            .with_max_retries(2)
            .fetch(&format!("{}/flaky.mp4", server.url()), &dest)
            .await;

        assert!(result.is_err());
        mock.assert_async().await;
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_playlist_content_type_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream")
            .with_status(200)
            .with_header("content-type", "application/vnd.apple.mpegurl")
            .with_body("#EXTM3U\n")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("stream.mp4");

        let result = test_agent()
            .fetch(&format!("{}/stream", server.url()), &dest)
            .await;

        assert!(matches!(result, Err(GrabError::UnexpectedPlaylist(_))));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_rate_limiter_wait() {
        let mut limiter = RateLimiter::new(1000);
        let start = Instant::now();

        limiter.wait_if_needed(200).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(180));
        assert!(elapsed <= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_zero_rate_is_clamped() {
        let mut limiter = RateLimiter::new(0);
        assert_eq!(limiter.bytes_per_second, 1);

        limiter.wait_if_needed(0).await;
        assert_eq!(limiter.bytes_sent, 0);
    }
}

//! Detail page of a single video

use crate::browser::{BrowserSession, PageElement, ScrapeSettings};
use crate::core::VideoReference;
use crate::error::GrabError;
use tracing::debug;
use url::Url;

/// A video detail page not visited yet
pub struct VideoPage<'a, S: BrowserSession> {
    session: &'a S,
    url: String,
    settings: &'a ScrapeSettings,
}

impl<'a, S: BrowserSession> VideoPage<'a, S> {
    pub(crate) fn new(session: &'a S, url: String, settings: &'a ScrapeSettings) -> Self {
        Self {
            session,
            url,
            settings,
        }
    }

    /// Detail page URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Visit the page and read its title and media URL
    pub async fn resolve(self) -> Result<VideoReference, GrabError> {
        let selectors = &self.settings.selectors;
        self.session.navigate(&self.url).await?;

        let media = self
            .session
            .wait_for_element(&selectors.media, self.settings.timeouts.element)
            .await?;
        let media_url = media
            .attribute(&selectors.media_source_attribute)
            .await?
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .ok_or_else(|| GrabError::MissingAttribute {
                selector: selectors.media.clone(),
                attribute: selectors.media_source_attribute.clone(),
            })?;

        let title = self.session.title().await?;
        let title = match title.trim() {
            "" => fallback_title(&self.url),
            trimmed => trimmed.to_string(),
        };

        debug!("Resolved '{}' -> {}", title, media_url);
        Ok(VideoReference::new(title, media_url))
    }
}

/// Last non-empty path segment of `url`, or the whole URL
fn fallback_title(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| url.to_string())
}

//! Index of videos behind the shared link

use crate::browser::{BrowserSession, PageElement, ScrapeSettings};
use crate::error::GrabError;
use crate::pages::VideoPage;
use tracing::{debug, info};
use url::Url;

/// The rendered video index
pub struct VideoListPage<'a, S: BrowserSession> {
    session: &'a S,
    settings: &'a ScrapeSettings,
}

impl<'a, S: BrowserSession> VideoListPage<'a, S> {
    pub(crate) fn new(session: &'a S, settings: &'a ScrapeSettings) -> Self {
        Self { session, settings }
    }

    /// One detail page per video row, in row order.
    ///
    /// The index is read once; the returned pages only hold URLs.
    pub async fn list_videos(self) -> Result<Vec<VideoPage<'a, S>>, GrabError> {
        let selectors = &self.settings.selectors;
        self.session
            .wait_for_element(&selectors.list_ready, self.settings.timeouts.condition)
            .await?;

        let base = Url::parse(&self.session.current_url().await?)?;
        let anchors = self.session.find_elements(&selectors.video_link).await?;

        let mut pages = Vec::with_capacity(anchors.len());
        for anchor in anchors {
            let href = anchor
                .attribute("href")
                .await?
                .filter(|href| !href.trim().is_empty())
                .ok_or_else(|| GrabError::MissingAttribute {
                    selector: selectors.video_link.clone(),
                    attribute: "href".to_string(),
                })?;
            let url = base.join(href.trim())?;
            debug!("Found video page {}", url);
            pages.push(VideoPage::new(self.session, url.to_string(), self.settings));
        }

        info!("Found {} videos", pages.len());
        Ok(pages)
    }
}

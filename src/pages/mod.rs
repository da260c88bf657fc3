//! Page states of a shared link: login, video index, video detail.
//!
//! Control only moves forward: `LoginPage` yields a `VideoListPage`, which
//! yields one `VideoPage` per row, each resolving to a `VideoReference`.

pub mod login;
pub mod video_list;
pub mod video_page;

pub use login::*;
pub use video_list::*;
pub use video_page::*;

use crate::browser::{BrowserSession, ScrapeSettings};
use crate::core::VideoReference;
use crate::error::GrabError;
use tracing::{debug, warn};

/// Collect every video reference behind `target_url`.
///
/// Takes ownership of the session and closes it exactly once before
/// returning, whether scraping succeeded or not. A failed close is only
/// logged; the scrape result is returned either way.
pub async fn scrape<S: BrowserSession>(
    session: S,
    target_url: &str,
    password: Option<&str>,
    settings: &ScrapeSettings,
) -> Result<Vec<VideoReference>, GrabError> {
    let scraped = collect_references(&session, target_url, password, settings).await;
    if let Err(close_err) = session.close().await {
        warn!("Failed to close browser session: {}", close_err);
    }
    scraped
}

async fn collect_references<S: BrowserSession>(
    session: &S,
    target_url: &str,
    password: Option<&str>,
    settings: &ScrapeSettings,
) -> Result<Vec<VideoReference>, GrabError> {
    let landing = LoginPage::open(session, target_url, settings).await?;
    let list = match password {
        Some(password) => landing.login(password).await?,
        None => landing.skip_login(),
    };

    let mut videos = Vec::new();
    for page in list.list_videos().await? {
        debug!("Resolving {}", page.url());
        videos.push(page.resolve().await?);
    }
    Ok(videos)
}

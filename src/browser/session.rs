//! Browser session abstraction and bounded waits

use crate::error::GrabError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A single element handle on the current page
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Type text into the element
    async fn send_keys(&self, text: &str) -> Result<(), GrabError>;

    /// Clear the element's value
    async fn clear(&self) -> Result<(), GrabError>;

    /// Click the element
    async fn click(&self) -> Result<(), GrabError>;

    /// Whether the element currently accepts interaction
    async fn is_enabled(&self) -> Result<bool, GrabError>;

    /// Read an attribute, `None` when it is not set
    async fn attribute(&self, name: &str) -> Result<Option<String>, GrabError>;
}

/// A controllable browser
///
/// Every blocking call takes its timeout explicitly; implementations must not
/// rely on session-wide implicit waits.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Element: PageElement;

    /// Navigate to `url`
    async fn navigate(&self, url: &str) -> Result<(), GrabError>;

    /// URL of the page currently loaded
    async fn current_url(&self) -> Result<String, GrabError>;

    /// Find one element, failing with `ElementNotFound` if absent
    async fn find_element(&self, selector: &str) -> Result<Self::Element, GrabError>;

    /// Find every element matching `selector`, in document order
    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, GrabError>;

    /// Wait up to `timeout` for `selector` to match, failing with `Timeout`
    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, GrabError>;

    /// Title of the current page
    async fn title(&self) -> Result<String, GrabError>;

    /// End the session
    async fn close(&self) -> Result<(), GrabError>;
}

/// Poll `probe` every `interval` until it returns `true` or `timeout` elapses.
///
/// The probe is always run at least once. Errors from the probe abort the wait.
pub async fn poll_until<F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<(), GrabError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, GrabError>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if probe().await? {
            return Ok(());
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(GrabError::Timeout {
                what: what.to_string(),
                timeout,
            });
        }

        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

//! Shared-link landing page, optionally password protected

use crate::browser::{poll_until, BrowserSession, PageElement, ScrapeSettings};
use crate::error::GrabError;
use crate::pages::VideoListPage;
use tracing::{debug, info};

/// Character typed into the password field to make the submit control react
const PROBE_CHARACTER: &str = "a";

/// Landing page of the shared link
pub struct LoginPage<'a, S: BrowserSession> {
    session: &'a S,
    settings: &'a ScrapeSettings,
}

impl<'a, S: BrowserSession> LoginPage<'a, S> {
    /// Navigate to the shared link
    pub async fn open(
        session: &'a S,
        target_url: &str,
        settings: &'a ScrapeSettings,
    ) -> Result<Self, GrabError> {
        info!("Opening shared link {}", target_url);
        session.navigate(target_url).await?;
        Ok(Self { session, settings })
    }

    /// Continue without authenticating
    pub fn skip_login(self) -> VideoListPage<'a, S> {
        debug!("No password configured, skipping login");
        VideoListPage::new(self.session, self.settings)
    }

    /// Submit `password` once the form accepts input
    pub async fn login(self, password: &str) -> Result<VideoListPage<'a, S>, GrabError> {
        let timeouts = &self.settings.timeouts;
        poll_until(
            "password submit to become enabled",
            timeouts.condition,
            timeouts.poll_interval,
            || self.submit_ready(),
        )
        .await?;

        let selectors = &self.settings.selectors;
        self.session
            .find_element(&selectors.password_field)
            .await?
            .send_keys(password)
            .await?;
        self.session
            .find_element(&selectors.submit_button)
            .await?
            .click()
            .await?;

        info!("Password submitted");
        Ok(VideoListPage::new(self.session, self.settings))
    }

    /// Whether the submit control is enabled.
    ///
    /// The control stays disabled while the password field is empty, so the
    /// probe types one character, reads the state and clears the field again.
    /// The field is empty afterwards whatever the outcome of the read.
    pub async fn submit_ready(&self) -> Result<bool, GrabError> {
        let selectors = &self.settings.selectors;
        let field = self.session.find_element(&selectors.password_field).await?;
        let submit = self.session.find_element(&selectors.submit_button).await?;

        field.send_keys(PROBE_CHARACTER).await?;
        let enabled = submit.is_enabled().await;
        field.clear().await?;

        let enabled = enabled?;
        debug!("Submit enabled: {}", enabled);
        Ok(enabled)
    }
}

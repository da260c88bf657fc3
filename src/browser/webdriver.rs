//! WebDriver-backed browser session

use crate::browser::session::{BrowserSession, PageElement};
use crate::error::GrabError;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Browser flavour, used to shape the session capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

/// WebDriver connection settings
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// WebDriver server URL (chromedriver, geckodriver, selenium)
    pub server_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:4444".to_string(),
            browser: BrowserKind::Chrome,
            headless: false,
        }
    }
}

impl WebDriverConfig {
    /// Build the capabilities sent when opening the session
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        match self.browser {
            BrowserKind::Chrome => {
                caps.insert("browserName".into(), json!("chrome"));
                if self.headless {
                    caps.insert(
                        "goog:chromeOptions".into(),
                        json!({ "args": ["--headless=new", "--disable-gpu"] }),
                    );
                }
            }
            BrowserKind::Firefox => {
                caps.insert("browserName".into(), json!("firefox"));
                if self.headless {
                    caps.insert("moz:firefoxOptions".into(), json!({ "args": ["-headless"] }));
                }
            }
        }
        caps
    }
}

/// Browser session over a WebDriver server
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Open a new browser session
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, GrabError> {
        info!(
            "Connecting to WebDriver at {} ({:?}, headless={})",
            config.server_url, config.browser, config.headless
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(config.capabilities());

        let client = builder
            .connect(&config.server_url)
            .await
            .map_err(|e| GrabError::Browser(e.to_string()))?;

        Ok(Self { client })
    }
}

/// Element handle from a WebDriver session
pub struct WebDriverElement {
    element: Element,
    selector: String,
}

fn element_error(selector: &str, err: CmdError) -> GrabError {
    if err.is_no_such_element() {
        GrabError::ElementNotFound(selector.to_string())
    } else {
        GrabError::Browser(format!("{}: {}", selector, err))
    }
}

#[async_trait]
impl PageElement for WebDriverElement {
    async fn send_keys(&self, text: &str) -> Result<(), GrabError> {
        self.element
            .send_keys(text)
            .await
            .map_err(|e| element_error(&self.selector, e))
    }

    async fn clear(&self) -> Result<(), GrabError> {
        self.element
            .clear()
            .await
            .map_err(|e| element_error(&self.selector, e))
    }

    async fn click(&self) -> Result<(), GrabError> {
        self.element
            .click()
            .await
            .map_err(|e| element_error(&self.selector, e))
    }

    async fn is_enabled(&self) -> Result<bool, GrabError> {
        self.element
            .is_enabled()
            .await
            .map_err(|e| element_error(&self.selector, e))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, GrabError> {
        self.element
            .attr(name)
            .await
            .map_err(|e| element_error(&self.selector, e))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = WebDriverElement;

    async fn navigate(&self, url: &str) -> Result<(), GrabError> {
        debug!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| GrabError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn current_url(&self) -> Result<String, GrabError> {
        let url = self
            .client
            .current_url()
            .await
            .map_err(|e| GrabError::Browser(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn find_element(&self, selector: &str) -> Result<Self::Element, GrabError> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(WebDriverElement {
            element,
            selector: selector.to_string(),
        })
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, GrabError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| element_error(selector, e))?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverElement {
                element,
                selector: selector.to_string(),
            })
            .collect())
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, GrabError> {
        debug!("Waiting up to {:?} for {}", timeout, selector);
        let element = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => GrabError::Timeout {
                    what: selector.to_string(),
                    timeout,
                },
                other => element_error(selector, other),
            })?;
        Ok(WebDriverElement {
            element,
            selector: selector.to_string(),
        })
    }

    async fn title(&self) -> Result<String, GrabError> {
        self.client
            .title()
            .await
            .map_err(|e| GrabError::Browser(e.to_string()))
    }

    async fn close(&self) -> Result<(), GrabError> {
        info!("Closing browser session");
        // Closing any handle ends the shared session.
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| GrabError::Browser(e.to_string()))
    }
}

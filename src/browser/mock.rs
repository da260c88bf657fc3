//! In-memory browser session for tests

use crate::browser::config::Selectors;
use crate::browser::session::{BrowserSession, PageElement};
use crate::error::GrabError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One page the mock browser can navigate to
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub title: String,
    /// `href` of every video anchor, `None` for an anchor without one
    pub links: Vec<Option<String>>,
    pub media_src: Option<String>,
    pub list_ready: bool,
}

impl MockPage {
    pub fn listing(links: &[&str]) -> Self {
        Self {
            links: links.iter().map(|l| Some(l.to_string())).collect(),
            list_ready: true,
            ..Default::default()
        }
    }

    pub fn video(title: &str, media_src: &str) -> Self {
        Self {
            title: title.to_string(),
            media_src: Some(media_src.to_string()),
            ..Default::default()
        }
    }
}

/// Observable state shared between a session and the test holding it
#[derive(Debug, Default)]
pub struct MockState {
    pub pages: HashMap<String, MockPage>,
    pub current_url: Option<String>,
    pub navigations: Vec<String>,
    pub password_field: String,
    /// Every value the password field held right before a probe cleared it
    pub probed_values: Vec<String>,
    pub submitted_password: Option<String>,
    /// Submit reports disabled for this many reads, even with text typed
    pub disabled_reads: usize,
    pub fail_enabled_read: bool,
    pub enabled_reads: usize,
    pub last_enabled: bool,
    pub clicked_while_enabled: bool,
    pub password_interactions: usize,
    pub close_calls: usize,
    pub fail_close: bool,
}

#[derive(Clone)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
    selectors: Selectors,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            selectors: Selectors::default(),
        }
    }

    pub fn with_page(self, url: &str, page: MockPage) -> Self {
        self.state().pages.insert(url.to_string(), page);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn element(&self, kind: MockKind) -> MockElement {
        MockElement {
            kind,
            state: self.state.clone(),
        }
    }

    fn lookup(&self, selector: &str) -> Option<MockElement> {
        let state = self.state();
        let page = state
            .current_url
            .as_ref()
            .and_then(|url| state.pages.get(url))?
            .clone();
        drop(state);

        let s = &self.selectors;
        if selector == s.password_field {
            Some(self.element(MockKind::PasswordField))
        } else if selector == s.submit_button {
            Some(self.element(MockKind::SubmitButton))
        } else if selector == s.list_ready && page.list_ready {
            Some(self.element(MockKind::Marker))
        } else if selector == s.media && page.media_src.is_some() {
            Some(self.element(MockKind::Media(page.media_src)))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
enum MockKind {
    PasswordField,
    SubmitButton,
    Marker,
    Link(Option<String>),
    Media(Option<String>),
}

pub struct MockElement {
    kind: MockKind,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl PageElement for MockElement {
    async fn send_keys(&self, text: &str) -> Result<(), GrabError> {
        let mut state = self.state.lock().unwrap();
        if let MockKind::PasswordField = self.kind {
            state.password_field.push_str(text);
            state.password_interactions += 1;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), GrabError> {
        let mut state = self.state.lock().unwrap();
        if let MockKind::PasswordField = self.kind {
            let previous = std::mem::take(&mut state.password_field);
            state.probed_values.push(previous);
            state.password_interactions += 1;
        }
        Ok(())
    }

    async fn click(&self) -> Result<(), GrabError> {
        let mut state = self.state.lock().unwrap();
        if let MockKind::SubmitButton = self.kind {
            state.password_interactions += 1;
            state.clicked_while_enabled = state.last_enabled;
            state.submitted_password = Some(state.password_field.clone());
        }
        Ok(())
    }

    async fn is_enabled(&self) -> Result<bool, GrabError> {
        let mut state = self.state.lock().unwrap();
        if let MockKind::SubmitButton = self.kind {
            state.password_interactions += 1;
            state.enabled_reads += 1;
            if state.fail_enabled_read {
                return Err(GrabError::Browser("stale element".into()));
            }
            let enabled =
                !state.password_field.is_empty() && state.enabled_reads > state.disabled_reads;
            state.last_enabled = enabled;
            return Ok(enabled);
        }
        Ok(true)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, GrabError> {
        Ok(match (&self.kind, name) {
            (MockKind::Link(href), "href") => href.clone(),
            (MockKind::Media(src), "src") => src.clone(),
            _ => None,
        })
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> Result<(), GrabError> {
        let mut state = self.state();
        state.navigations.push(url.to_string());
        if !state.pages.contains_key(url) {
            return Err(GrabError::Navigation {
                url: url.to_string(),
                reason: "404".to_string(),
            });
        }
        state.current_url = Some(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String, GrabError> {
        self.state()
            .current_url
            .clone()
            .ok_or_else(|| GrabError::Browser("no page loaded".into()))
    }

    async fn find_element(&self, selector: &str) -> Result<Self::Element, GrabError> {
        self.lookup(selector)
            .ok_or_else(|| GrabError::ElementNotFound(selector.to_string()))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, GrabError> {
        if selector != self.selectors.video_link {
            return Ok(Vec::new());
        }
        let links = {
            let state = self.state();
            state
                .current_url
                .as_ref()
                .and_then(|url| state.pages.get(url))
                .map(|page| page.links.clone())
                .unwrap_or_default()
        };
        Ok(links
            .into_iter()
            .map(|href| self.element(MockKind::Link(href)))
            .collect())
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, GrabError> {
        if let Some(element) = self.lookup(selector) {
            return Ok(element);
        }
        tokio::time::sleep(timeout).await;
        Err(GrabError::Timeout {
            what: selector.to_string(),
            timeout,
        })
    }

    async fn title(&self) -> Result<String, GrabError> {
        let state = self.state();
        Ok(state
            .current_url
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .map(|page| page.title.clone())
            .unwrap_or_default())
    }

    async fn close(&self) -> Result<(), GrabError> {
        let mut state = self.state();
        state.close_calls += 1;
        if state.fail_close {
            return Err(GrabError::Browser("session already gone".into()));
        }
        Ok(())
    }
}

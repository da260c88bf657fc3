//! Timeouts and selectors used while driving the shared-link pages

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded waits, passed explicitly to every blocking browser call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long to wait for an element to appear after navigation
    pub element: Duration,
    /// How long to wait for a page condition (submit enabled, list rendered)
    pub condition: Duration,
    /// Delay between two polls of a condition
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element: Duration::from_secs(10),
            condition: Duration::from_secs(3),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// CSS selectors for the controls of the shared-link pages.
///
/// Job files may override any subset of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub password_field: String,
    pub submit_button: String,
    /// Present once the video index has finished rendering
    pub list_ready: String,
    /// One anchor per video row
    pub video_link: String,
    /// Media element on a video detail page
    pub media: String,
    /// Attribute of the media element holding the stream URL
    pub media_source_attribute: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            password_field: r#"input[type="password"]"#.to_string(),
            submit_button: r#"button[type="submit"]"#.to_string(),
            list_ready: r#"button[data-testid="download-button"]"#.to_string(),
            video_link: r#"[role="row"] a[href]"#.to_string(),
            media: "video".to_string(),
            media_source_attribute: "src".to_string(),
        }
    }
}

/// Everything the page states need besides the session itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSettings {
    pub timeouts: Timeouts,
    pub selectors: Selectors,
}

impl ScrapeSettings {
    /// Replace the timeouts
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replace the selectors
    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }
}

//! Scraped video references

use serde::{Deserialize, Serialize};

/// One video found behind the shared link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// Page title; becomes the output file stem after sanitising
    pub title: String,
    /// Direct media URL (HLS playlist or plain file)
    pub media_url: String,
}

impl VideoReference {
    pub fn new(title: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            media_url: media_url.into(),
        }
    }
}

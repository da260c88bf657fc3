//! Job files: what to download and from where

use crate::browser::Selectors;
use crate::core::VideoReference;
use crate::error::GrabError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory used when neither the command line nor the job names one
pub const DEFAULT_DESTINATION: &str = "down";

/// A shared link to scrape
#[derive(Debug, Clone, Deserialize)]
pub struct ShareJob {
    /// Shared-link URL
    pub url: String,
    /// Password for protected links; empty means none
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "directory", alias = "dest")]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub selectors: Option<Selectors>,
}

impl ShareJob {
    /// The password, if one is set and non-empty
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Identifier of a direct entry, numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{}", n),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

/// A media URL already known, no browser needed
#[derive(Debug, Clone, Deserialize)]
pub struct DirectEntry {
    pub id: EntryId,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl DirectEntry {
    /// Title used for the output file
    pub fn title(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("week_{}", self.id))
    }
}

/// Contents of a job file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobFile {
    Share(ShareJob),
    Direct(Vec<DirectEntry>),
}

impl JobFile {
    /// Parse a job from JSON text
    pub fn parse(text: &str) -> Result<Self, GrabError> {
        let job: JobFile = serde_json::from_str(text).map_err(|e| {
            GrabError::InvalidJob(format!(
                "expected {{\"url\": ..., \"password\": ...}} or a list of {{\"id\": ..., \"url\": ...}}: {}",
                e
            ))
        })?;
        job.validate()?;
        Ok(job)
    }

    /// Read and parse a job file
    pub async fn load(path: &Path) -> Result<Self, GrabError> {
        debug!("Loading job from {}", path.display());
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    fn validate(&self) -> Result<(), GrabError> {
        match self {
            JobFile::Share(job) => {
                url::Url::parse(&job.url)?;
            }
            JobFile::Direct(entries) => {
                if entries.is_empty() {
                    return Err(GrabError::InvalidJob("the video list is empty".into()));
                }
                for entry in entries {
                    url::Url::parse(&entry.url)?;
                }
            }
        }
        Ok(())
    }

    /// Destination named by the job itself
    pub fn destination(&self) -> Option<&Path> {
        match self {
            JobFile::Share(job) => job.destination.as_deref(),
            JobFile::Direct(_) => None,
        }
    }

    /// References for a direct job, in file order
    pub fn direct_references(entries: &[DirectEntry]) -> Vec<VideoReference> {
        entries
            .iter()
            .map(|entry| VideoReference::new(entry.title(), entry.url.clone()))
            .collect()
    }
}

/// Pick the download directory: command line, then job, then the default
pub fn resolve_destination(cli: Option<&Path>, job: &JobFile) -> PathBuf {
    cli.or_else(|| job.destination())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATION))
}

//! # sharegrab
//!
//! Downloads every video behind a shared link, password-protected or not.
//!
//! A WebDriver-controlled browser unlocks the link, walks the video index
//! and reads each video page's media URL. The URLs are then fetched one by
//! one, HLS playlists through ffmpeg and plain files over HTTP.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sharegrab::browser::{WebDriverConfig, WebDriverSession};
//! use sharegrab::core::{JobFile, Orchestrator};
//! use sharegrab::download::{build_agent, AgentKind, HlsAgent, HttpAgent};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let JobFile::Share(job) = JobFile::load(Path::new("urls.json")).await? else {
//!         return Ok(());
//!     };
//!
//!     let agent = build_agent(AgentKind::Auto, HlsAgent::new(), HttpAgent::new()?);
//!     let session = WebDriverSession::connect(&WebDriverConfig::default()).await?;
//!     let summary = Orchestrator::new(agent)
//!         .run(session, &job, Path::new("down"))
//!         .await?;
//!     println!("Downloaded {} videos", summary.downloaded);
//!
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod core;
pub mod download;
pub mod error;
pub mod pages;
pub mod utils;

// Re-export main types
pub use browser::WebDriverSession;
pub use core::{JobFile, Orchestrator, RunOptions, RunSummary, VideoReference};
pub use download::DownloadAgent;
pub use error::GrabError;

/// Result type alias for sharegrab operations
pub type Result<T> = std::result::Result<T, GrabError>;

//! Command line argument parsing

use crate::browser::{BrowserKind, Timeouts, WebDriverConfig};
use crate::download::AgentKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Download every video behind a (password-protected) shared link
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Job file: {"url": ..., "password": ...} or a list of {"id": ..., "url": ...}
    #[arg(value_name = "URL_FILE")]
    pub url_file: PathBuf,

    /// Download directory (defaults to the job's "destination", then ./down)
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, value_name = "URL", default_value = "http://localhost:4444")]
    pub webdriver: String,

    /// Browser behind the WebDriver server
    #[arg(long, value_enum, default_value = "chrome")]
    pub browser: BrowserArg,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Wait for page elements after navigation (e.g., 10s)
    #[arg(long, value_name = "DURATION", default_value = "10s")]
    pub element_timeout: humantime::Duration,

    /// Wait for page conditions such as an enabled submit button (e.g., 3s)
    #[arg(long, value_name = "DURATION", default_value = "3s")]
    pub wait_timeout: humantime::Duration,

    /// Delay between polls of a page condition
    #[arg(long, value_name = "DURATION", default_value = "250ms")]
    pub poll_interval: humantime::Duration,

    /// Output file extension
    #[arg(short, long, value_name = "EXT", default_value = "mp4")]
    pub ext: String,

    /// How media URLs are downloaded
    #[arg(long, value_enum, default_value = "auto")]
    pub agent: AgentArg,

    /// ffmpeg executable used for HLS streams
    #[arg(long, value_name = "PATH", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Working directory for ffmpeg
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// HTTP connect timeout (e.g., 30s, 1m)
    #[arg(long, value_name = "DURATION", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// HTTP retries for transient errors
    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Download rate limit (e.g., 2MiB/s, 500KiB/s)
    #[arg(long, value_name = "RATE")]
    pub rate_limit: Option<String>,

    /// Override User-Agent header of media requests
    #[arg(long, value_name = "USER_AGENT")]
    pub user_agent: Option<String>,

    /// Log a failed download and continue with the next one
    #[arg(long)]
    pub keep_going: bool,

    /// Print title and media URL of every video and exit (no download)
    #[arg(short = 'g', long)]
    pub print_urls: bool,

    /// Disable progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Browser flavour
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum BrowserArg {
    Chrome,
    Firefox,
}

/// Download agent selection
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum AgentArg {
    /// ffmpeg for HLS playlists, HTTP for everything else
    Auto,
    /// Always ffmpeg
    Hls,
    /// Always plain HTTP
    Http,
}

impl From<AgentArg> for AgentKind {
    fn from(arg: AgentArg) -> Self {
        match arg {
            AgentArg::Auto => AgentKind::Auto,
            AgentArg::Hls => AgentKind::Hls,
            AgentArg::Http => AgentKind::Http,
        }
    }
}

impl Args {
    /// Bounded waits for the page states
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            element: self.element_timeout.into(),
            condition: self.wait_timeout.into(),
            poll_interval: self.poll_interval.into(),
        }
    }

    /// WebDriver connection settings
    pub fn webdriver_config(&self) -> WebDriverConfig {
        WebDriverConfig {
            server_url: self.webdriver.clone(),
            browser: match self.browser {
                BrowserArg::Chrome => BrowserKind::Chrome,
                BrowserArg::Firefox => BrowserKind::Firefox,
            },
            headless: self.headless,
        }
    }

    /// Get HTTP connect timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Parse rate limit string to bytes per second
    pub fn parse_rate_limit(&self) -> Option<u64> {
        self.rate_limit.as_deref().and_then(parse_rate_limit)
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_level() {
            VerbosityLevel::Quiet => "warn",
            VerbosityLevel::Normal => "info",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

/// Parse a rate such as `2MiB/s` or `500KB` to bytes per second
pub fn parse_rate_limit(rate: &str) -> Option<u64> {
    let rate = rate.trim().to_uppercase();
    let rate = rate.strip_suffix("/S").unwrap_or(&rate);

    let split = rate
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rate.len());
    let (number, unit) = rate.split_at(split);

    let number: f64 = number.parse().ok()?;
    if number <= 0.0 {
        return None;
    }

    let multiplier: u64 = match unit.trim() {
        "B" | "" => 1,
        "KB" => 1000,
        "KIB" => 1024,
        "MB" => 1000 * 1000,
        "MIB" => 1024 * 1024,
        "GB" => 1000 * 1000 * 1000,
        "GIB" => 1024 * 1024 * 1024,
        _ => return None,
    };

    Some((number * multiplier as f64) as u64).filter(|bps| *bps > 0)
}

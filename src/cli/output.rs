//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::progress::{format_bytes, format_duration, Progress};
use crate::core::{RunEvent, RunSummary, VideoReference};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {prefix} [{elapsed_precise}] {bytes} {msg}";
const BAR_TEMPLATE: &str =
    "{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}";

/// Terminal output for sharegrab
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    show_progress: bool,
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel, show_progress: bool) -> Self {
        Self {
            verbosity,
            show_progress: show_progress && verbosity != VerbosityLevel::Quiet,
            progress_bar: Mutex::new(None),
        }
    }

    fn style(template: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .progress_chars("#>-")
    }

    fn with_bar<F: FnOnce(&mut Option<ProgressBar>)>(&self, f: F) {
        if let Ok(mut slot) = self.progress_bar.lock() {
            f(&mut slot);
        }
    }

    /// Start a spinner for one download
    pub fn start_progress(&self, title: &str) {
        if !self.show_progress {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::style(SPINNER_TEMPLATE));
        bar.set_prefix(title.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        self.with_bar(|slot| *slot = Some(bar));
    }

    /// Update the current bar with byte counts
    pub fn update_progress(&self, progress: &Progress) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.as_ref() {
                if progress.total_size > 0 && bar.length() != Some(progress.total_size) {
                    bar.set_length(progress.total_size);
                    bar.set_style(Self::style(BAR_TEMPLATE));
                }
                bar.set_position(progress.downloaded_size);
                if let Some(speed) = progress.speed {
                    bar.set_message(format!("{}/s", format_bytes(speed as u64)));
                }
            }
        });
    }

    /// Finish and drop the current bar
    pub fn finish_progress(&self) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        });
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("✅ {}", message);
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("⚠️  {}", message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message);
    }

    /// React to orchestrator progress
    pub fn handle_event(&self, event: &RunEvent) {
        match event {
            RunEvent::Discovered { count } => {
                self.info(&format!("Found {} videos", count));
            }
            RunEvent::Skipped { index, total, path } => {
                self.info(&format!(
                    "[{}/{}] Already downloaded: {}",
                    index + 1,
                    total,
                    path.display()
                ));
            }
            RunEvent::Started {
                index,
                total,
                title,
                path,
            } => {
                if self.verbosity != VerbosityLevel::Quiet {
                    println!("📥 [{}/{}] {} -> {}", index + 1, total, title, path.display());
                }
                self.start_progress(title);
            }
            RunEvent::Finished { path, .. } => {
                self.finish_progress();
                self.success(&format!("Saved {}", path.display()));
            }
            RunEvent::Failed { title, reason, .. } => {
                self.finish_progress();
                self.error(&format!("{}: {}", title, reason));
            }
        }
    }

    /// Print the scraped references, one `title<TAB>url` per line
    pub fn print_references(&self, videos: &[VideoReference]) {
        for video in videos {
            println!("{}\t{}", video.title, video.media_url);
        }
    }

    /// Print the run summary
    pub fn print_summary(&self, summary: &RunSummary, elapsed: Duration) {
        if self.verbosity == VerbosityLevel::Quiet && summary.is_success() {
            return;
        }
        println!();
        println!(
            "📊 {} found, {} downloaded, {} skipped, {} failed in {}",
            summary.discovered,
            summary.downloaded,
            summary.skipped,
            summary.failed.len(),
            format_duration(elapsed)
        );
        for (title, reason) in &summary.failed {
            self.error(&format!("{}: {}", title, reason));
        }
    }
}

/// Create a progress callback for the HTTP agent
pub fn create_progress_callback(
    formatter: Arc<OutputFormatter>,
) -> impl Fn(Progress) + Send + Sync + 'static {
    move |progress: Progress| {
        formatter.update_progress(&progress);
    }
}

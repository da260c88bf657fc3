//! Main entry point for sharegrab CLI

use anyhow::{bail, Context};
use clap::Parser;
use sharegrab::browser::{ScrapeSettings, WebDriverSession};
use sharegrab::cli::{create_progress_callback, Args, OutputFormatter};
use sharegrab::core::{resolve_destination, JobFile, Orchestrator, RunOptions, RunSummary};
use sharegrab::download::{build_agent, DownloadAgent, HlsAgent, HlsAgentConfig, HttpAgent, HttpAgentConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    init_logging(&args)?;
    debug!("Starting sharegrab with args: {:?}", args);

    let formatter = Arc::new(OutputFormatter::new(
        args.verbosity_level(),
        !args.no_progress && !args.print_urls,
    ));

    let job = JobFile::load(&args.url_file)
        .await
        .with_context(|| format!("Failed to load job file {}", args.url_file.display()))?;
    let destination = resolve_destination(args.directory.as_deref(), &job);

    let agent = build_download_agent(&args, formatter.clone())?;
    let options = RunOptions {
        extension: args.ext.clone(),
        keep_going: args.keep_going,
        scrape: ScrapeSettings::default().with_timeouts(args.timeouts()),
    };
    let events = formatter.clone();
    let orchestrator =
        Orchestrator::with_options(agent, options).with_events(move |event| events.handle_event(&event));

    let start_time = Instant::now();
    let result = match &job {
        JobFile::Share(share) => {
            let session = WebDriverSession::connect(&args.webdriver_config())
                .await
                .context("Failed to open a browser session")?;

            if args.print_urls {
                let videos = orchestrator.collect(session, share).await?;
                formatter.print_references(&videos);
                return Ok(());
            }

            info!("Downloading {} into {}", share.url, destination.display());
            orchestrator.run(session, share, &destination).await
        }
        JobFile::Direct(entries) => {
            let videos = JobFile::direct_references(entries);
            if args.print_urls {
                formatter.print_references(&videos);
                return Ok(());
            }

            info!("Downloading {} listed videos into {}", videos.len(), destination.display());
            orchestrator.download_all(&videos, &destination).await
        }
    };

    let summary: RunSummary = match result {
        Ok(summary) => summary,
        Err(e) => {
            formatter.finish_progress();
            if e.is_browser_error() {
                formatter.warning(&format!(
                    "Browser step failed; check that a WebDriver server is running at {}",
                    args.webdriver
                ));
            }
            return Err(e.into());
        }
    };

    formatter.print_summary(&summary, start_time.elapsed());
    if !summary.is_success() {
        formatter.warning("Some videos were not downloaded, run again to retry them");
        bail!("{} of {} downloads failed", summary.failed.len(), summary.discovered);
    }

    Ok(())
}

/// Build the download agent selected on the command line
fn build_download_agent(
    args: &Args,
    formatter: Arc<OutputFormatter>,
) -> anyhow::Result<Box<dyn DownloadAgent>> {
    let rate_limit_bps = args.parse_rate_limit();
    if let (Some(rate), None) = (&args.rate_limit, rate_limit_bps) {
        bail!("Invalid rate limit '{}', expected e.g. 2MiB/s or 500KB", rate);
    }

    let mut http_config = HttpAgentConfig {
        connect_timeout: args.timeout_duration(),
        max_retries: args.retries,
        rate_limit_bps,
        ..Default::default()
    };
    if let Some(user_agent) = &args.user_agent {
        http_config.user_agent = user_agent.clone();
    }

    let mut http = HttpAgent::with_config(http_config).context("Failed to build HTTP client")?;
    if !args.no_progress {
        http = http.with_progress_callback(create_progress_callback(formatter));
    }

    let hls = HlsAgent::with_config(HlsAgentConfig {
        ffmpeg_path: args.ffmpeg.clone(),
        working_dir: args.work_dir.clone(),
        user_agent: args.user_agent.clone(),
    });

    Ok(build_agent(args.agent.into(), hls, http))
}

/// Initialize logging system
fn init_logging(args: &Args) -> anyhow::Result<()> {
    // RUST_LOG wins over the verbosity flags
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

//! HLS download through an external ffmpeg process

use crate::download::DownloadAgent;
use crate::error::GrabError;
use crate::utils::{ffmpeg_format, partial_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How many trailing stderr lines end up in an error message
const STDERR_TAIL_LINES: usize = 5;

/// ffmpeg agent configuration
#[derive(Debug, Clone)]
pub struct HlsAgentConfig {
    /// ffmpeg executable, looked up on `PATH` when not absolute
    pub ffmpeg_path: PathBuf,
    /// Directory ffmpeg runs in
    pub working_dir: Option<PathBuf>,
    /// Sent as the `User-Agent` of playlist and segment requests
    pub user_agent: Option<String>,
}

impl Default for HlsAgentConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            working_dir: None,
            user_agent: None,
        }
    }
}

/// Remuxes an HLS stream into a single file with `ffmpeg -c copy`
pub struct HlsAgent {
    config: HlsAgentConfig,
}

impl HlsAgent {
    pub fn new() -> Self {
        Self::with_config(HlsAgentConfig::default())
    }

    pub fn with_config(config: HlsAgentConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to ffmpeg for one download
    fn arguments(&self, media_url: &str, output: &Path, format: &str) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = ["-hide_banner", "-loglevel", "error", "-nostdin", "-y"]
            .iter()
            .map(Into::into)
            .collect();

        if let Some(agent) = &self.config.user_agent {
            args.push("-user_agent".into());
            args.push(agent.into());
        }

        args.extend(["-i", media_url, "-c", "copy"].iter().map(Into::into));
        if format == "mp4" {
            // ADTS AAC from transport-stream segments must be rewrapped for MP4.
            args.extend(["-bsf:a", "aac_adtstoasc"].iter().map(Into::into));
        }
        args.extend(["-f", format].iter().map(Into::into));
        args.push(output.as_os_str().to_os_string());
        args
    }
}

impl Default for HlsAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadAgent for HlsAgent {
    async fn fetch(&self, media_url: &str, destination: &Path) -> Result<(), GrabError> {
        info!("Fetching HLS stream {} to {}", media_url, destination.display());

        // ffmpeg may run elsewhere, so hand it an absolute path.
        let destination = if destination.is_absolute() {
            destination.to_path_buf()
        } else {
            std::env::current_dir()?.join(destination)
        };
        let partial = partial_path(&destination);
        let format = ffmpeg_format(
            &destination
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(self.arguments(media_url, &partial, format))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        debug!("Running {:?}", command);
        let output = command.output().await.map_err(|e| {
            GrabError::DownloadFailed(format!(
                "could not run {}: {}",
                self.config.ffmpeg_path.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let _ = tokio::fs::remove_file(&partial).await;
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("; ");
            warn!("ffmpeg failed for {}: {}", media_url, tail);
            return Err(GrabError::DownloadFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status, tail
            )));
        }

        if tokio::fs::metadata(&partial).await.is_err() {
            return Err(GrabError::DownloadFailed(format!(
                "ffmpeg produced no output for {}",
                media_url
            )));
        }

        tokio::fs::rename(&partial, &destination).await?;
        info!("Saved {}", destination.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_for_mp4() {
        let agent = HlsAgent::with_config(HlsAgentConfig {
            user_agent: Some("sharegrab-test".to_string()),
            ..Default::default()
        });
        let args: Vec<String> = agent
            .arguments("https://cdn.example/w1.m3u8", Path::new("/tmp/w1.mp4.part"), "mp4")
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-hide_banner", "-loglevel", "error", "-nostdin", "-y",
                "-user_agent", "sharegrab-test",
                "-i", "https://cdn.example/w1.m3u8", "-c", "copy",
                "-bsf:a", "aac_adtstoasc",
                "-f", "mp4", "/tmp/w1.mp4.part",
            ]
        );
    }

    #[test]
    fn test_arguments_for_matroska_skip_bitstream_filter() {
        let args: Vec<String> = HlsAgent::new()
            .arguments("https://cdn.example/w1.m3u8", Path::new("out.mkv.part"), "matroska")
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(!args.iter().any(|a| a == "-bsf:a"));
        assert_eq!(&args[args.len() - 2..], ["matroska", "out.mkv.part"]);
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Week 1.mp4");
        let agent = HlsAgent::with_config(HlsAgentConfig {
            ffmpeg_path: dir.path().join("no-such-ffmpeg"),
            ..Default::default()
        });

        let result = agent.fetch("https://cdn.example/w1.m3u8", &dest).await;

        assert!(matches!(result, Err(GrabError::DownloadFailed(_))));
        assert!(!dest.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fake_ffmpeg_success_and_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let install = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        };
        // Writes the input URL into the last argument, the output file.
        let good = install("good-ffmpeg", r#"for last; do :; done; echo "$7" > "$last""#);
        let bad = install("bad-ffmpeg", "echo 'Server returned 403 Forbidden' >&2; exit 1");

        let dest = dir.path().join("Week 1.mp4");
        HlsAgent::with_config(HlsAgentConfig {
            ffmpeg_path: good,
            ..Default::default()
        })
        .fetch("https://cdn.example/w1.m3u8", &dest)
        .await
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap().trim(),
            "https://cdn.example/w1.m3u8"
        );
        assert!(!partial_path(&dest).exists());

        let failed = dir.path().join("Week 2.mp4");
        let result = HlsAgent::with_config(HlsAgentConfig {
            ffmpeg_path: bad,
            ..Default::default()
        })
        .fetch("https://cdn.example/w2.m3u8", &failed)
        .await;
        match result {
            Err(GrabError::DownloadFailed(message)) => assert!(message.contains("403")),
            other => panic!("expected download failure, got {:?}", other),
        }
        assert!(!failed.exists());
    }
}

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::cleanup::remove_quietly;
use crate::config::ScratchConfig;
use crate::utils::scratch_audio_path;
use crate::PipelineError;

/// Produces a local audio file from a video URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download the audio track of `video_url` into scratch storage and
    /// return the resulting file path. The URL is handed to the external
    /// tool as-is; whatever it rejects surfaces as the failure cause.
    async fn download(&self, video_url: &str) -> Result<PathBuf, PipelineError>;
}

/// Audio downloader backed by the yt-dlp CLI.
pub struct YtDlpDownloader {
    yt_dlp_path: String,
    scratch_dir: PathBuf,
}

impl YtDlpDownloader {
    pub fn new(scratch: &ScratchConfig) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            scratch_dir: scratch.dir.clone(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        matches!(output, Ok(out) if out.status.success())
    }

    /// A failed run may still have written a partial file at the expected
    /// output path; scrub it so failures never leak scratch storage.
    async fn fail(&self, audio_path: &Path, cause: String) -> PipelineError {
        remove_quietly(audio_path).await;
        PipelineError::Download(cause)
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    async fn download(&self, video_url: &str) -> Result<PathBuf, PipelineError> {
        if let Err(e) = tokio::fs::create_dir_all(&self.scratch_dir).await {
            return Err(PipelineError::Download(format!(
                "cannot create scratch directory {}: {}",
                self.scratch_dir.display(),
                e
            )));
        }

        let base = scratch_audio_path(&self.scratch_dir);
        let audio_path = base.with_extension("mp3");
        // yt-dlp fills in the extension itself after audio conversion.
        let output_template = format!("{}.%(ext)s", base.display());

        tracing::debug!(url = %video_url, output = %audio_path.display(), "Invoking yt-dlp");

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--extract-audio",
                "--audio-format",
                "mp3",
                "--no-playlist",
                "--output",
                &output_template,
                video_url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                let cause = format!("failed to run {}: {}", self.yt_dlp_path, e);
                return Err(self.fail(&audio_path, cause).await);
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let cause = if stderr.trim().is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                format!("yt-dlp failed: {}", stderr.trim())
            };
            return Err(self.fail(&audio_path, cause).await);
        }

        match tokio::fs::metadata(&audio_path).await {
            Ok(meta) if meta.is_file() => Ok(audio_path),
            _ => {
                let cause = format!(
                    "yt-dlp produced no output file at {}",
                    audio_path.display()
                );
                Err(self.fail(&audio_path, cause).await)
            }
        }
    }
}

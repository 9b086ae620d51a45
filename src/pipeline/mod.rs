use std::sync::Arc;

use crate::cleanup::ScratchCleaner;
use crate::downloader::AudioDownloader;
use crate::transcriber::{SpeechTranscriber, Transcript};
use crate::PipelineError;

/// Sequences download, transcription and cleanup for one request.
///
/// The scratch audio file is the only resource a run acquires. Once the
/// download succeeds the cleaner is invoked exactly once before the run
/// returns, whether transcription succeeded or not; cleanup is infallible
/// by contract so it can never mask the primary outcome.
pub struct TranscriptionPipeline {
    downloader: Arc<dyn AudioDownloader>,
    transcriber: Arc<dyn SpeechTranscriber>,
    cleaner: Arc<dyn ScratchCleaner>,
}

impl TranscriptionPipeline {
    pub fn new(
        downloader: Arc<dyn AudioDownloader>,
        transcriber: Arc<dyn SpeechTranscriber>,
        cleaner: Arc<dyn ScratchCleaner>,
    ) -> Self {
        Self {
            downloader,
            transcriber,
            cleaner,
        }
    }

    /// Run the full pipeline for one request.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, video_url: Option<&str>) -> Result<Transcript, PipelineError> {
        let video_url = match video_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(PipelineError::MissingVideoUrl),
        };

        tracing::info!(url = %video_url, "Received transcription request");

        // A failed download owns its own scrubbing; nothing to release here.
        let audio_path = self.downloader.download(video_url).await?;
        tracing::info!(path = %audio_path.display(), "Audio downloaded");

        // Capture the outcome first so release happens on both paths.
        let result = self.transcriber.transcribe(&audio_path).await;
        self.cleaner.remove(&audio_path).await;

        match &result {
            Ok(transcript) => {
                tracing::info!(segments = transcript.segments.len(), "Transcription complete")
            }
            Err(e) => tracing::error!(error = %e, "Pipeline failed"),
        }

        result
    }
}

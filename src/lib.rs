//! Transcribe Server - an HTTP service that turns video URLs into transcripts
//!
//! Given a video URL, the service extracts the audio track with yt-dlp, sends it
//! to the OpenAI Whisper API and returns the transcript as timestamped segments.
//! The scratch audio file is released on every exit path, success or failure.

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod pipeline;
pub mod server;
pub mod transcriber;
pub mod utils;

pub use config::Config;
pub use pipeline::TranscriptionPipeline;
pub use transcriber::{Segment, Transcript};

/// Error types produced by the transcription pipeline
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("videoUrl is required")]
    MissingVideoUrl,

    #[error("failed to download audio: {0}")]
    Download(String),

    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,

    #[error("transcription failed: {0}")]
    Transcription(String),
}

impl PipelineError {
    /// HTTP status the error maps to at the service boundary.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            PipelineError::MissingVideoUrl => StatusCode::BAD_REQUEST,
            PipelineError::Download(_)
            | PipelineError::MissingApiKey
            | PipelineError::Transcription(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::PipelineError;

/// Normalized transcription result returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Language code reported by the service, or the configured fallback.
    pub language: String,

    /// Chronological segments, exactly as the service ordered them.
    pub segments: Vec<Segment>,
}

/// A timestamped span of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,

    /// End offset in seconds
    pub end: f64,

    /// Segment text, trimmed of surrounding whitespace
    pub text: String,
}

/// Turns a local audio file into a [`Transcript`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, PipelineError>;
}

/// Transcriber backed by the OpenAI Whisper API.
pub struct WhisperApiTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
    fallback_language: String,
}

impl WhisperApiTranscriber {
    pub fn new(openai: &OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: openai.api_key.clone(),
            base_url: openai.base_url.clone(),
            model: openai.model.clone(),
            language: openai.language.clone(),
            fallback_language: openai.fallback_language.clone(),
        }
    }

    fn normalize(&self, raw: VerboseTranscription) -> Transcript {
        let segments = raw
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|s| Segment {
                start: s.start,
                end: s.end,
                text: s.text.trim().to_string(),
            })
            .collect();

        Transcript {
            language: raw
                .language
                .unwrap_or_else(|| self.fallback_language.clone()),
            segments,
        }
    }
}

/// Raw verbose_json payload from the Whisper API.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    language: Option<String>,
    segments: Option<Vec<RawSegment>>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl SpeechTranscriber for WhisperApiTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, PipelineError> {
        // Fail before any network round trip when the credential is absent.
        if self.api_key.is_empty() {
            return Err(PipelineError::MissingApiKey);
        }

        let audio_data = tokio::fs::read(audio_path).await.map_err(|e| {
            PipelineError::Transcription(format!(
                "cannot read audio file {}: {}",
                audio_path.display(),
                e
            ))
        })?;

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let file_part = multipart::Part::bytes(audio_data)
            .file_name(file_name)
            .mime_str("audio/mpeg")
            .map_err(|e| PipelineError::Transcription(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        let url = format!("{}/audio/transcriptions", self.base_url);

        tracing::debug!(model = %self.model, language = %self.language, "Sending audio to Whisper API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Transcription(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transcription(api_error_message(
                status, &body,
            )));
        }

        let raw: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| PipelineError::Transcription(format!("malformed response: {}", e)))?;

        let transcript = self.normalize(raw);

        tracing::info!(
            language = %transcript.language,
            segments = transcript.segments.len(),
            "Whisper transcription completed"
        );

        Ok(transcript)
    }
}

/// Prefer the service's own error message; fall back to the raw body or a
/// generic status description.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let remote_message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        });

    match remote_message {
        Some(msg) => format!("Whisper API error: {}", msg),
        None if !body.trim().is_empty() => {
            format!("Whisper API returned {}: {}", status, body.trim())
        }
        None => format!("Whisper API returned {}", status),
    }
}

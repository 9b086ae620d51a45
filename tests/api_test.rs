use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use transcribe_server::cleanup::ScratchCleaner;
use transcribe_server::downloader::AudioDownloader;
use transcribe_server::server::{create_router, AppState};
use transcribe_server::transcriber::SpeechTranscriber;
use transcribe_server::{PipelineError, Segment, Transcript, TranscriptionPipeline};

const AUDIO_PATH: &str = "/temp/audio_123.mp3";

fn sample_transcript() -> Transcript {
    Transcript {
        language: "pt".to_string(),
        segments: vec![
            Segment {
                start: 0.0,
                end: 5.0,
                text: "Olá mundo".to_string(),
            },
            Segment {
                start: 5.0,
                end: 10.0,
                text: "Teste de transcrição".to_string(),
            },
        ],
    }
}

#[derive(Default)]
struct StubDownloader {
    fail_with: Option<String>,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AudioDownloader for StubDownloader {
    async fn download(&self, _video_url: &str) -> Result<PathBuf, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(cause) => Err(PipelineError::Download(cause.clone())),
            None => Ok(PathBuf::from(AUDIO_PATH)),
        }
    }
}

#[derive(Default)]
struct StubTranscriber {
    fail_with: Option<String>,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl SpeechTranscriber for StubTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Transcript, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(cause) => Err(PipelineError::Transcription(cause.clone())),
            None => Ok(sample_transcript()),
        }
    }
}

#[derive(Default)]
struct RecordingCleaner {
    calls: AtomicUsize,
    last_path: std::sync::Mutex<Option<PathBuf>>,
}

#[async_trait::async_trait]
impl ScratchCleaner for RecordingCleaner {
    async fn remove(&self, path: &Path) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(path.to_path_buf());
    }
}

struct TestHarness {
    downloader: Arc<StubDownloader>,
    transcriber: Arc<StubTranscriber>,
    cleaner: Arc<RecordingCleaner>,
    router: axum::Router,
}

fn harness(downloader: StubDownloader, transcriber: StubTranscriber) -> TestHarness {
    let downloader = Arc::new(downloader);
    let transcriber = Arc::new(transcriber);
    let cleaner = Arc::new(RecordingCleaner::default());

    let pipeline = Arc::new(TranscriptionPipeline::new(
        downloader.clone(),
        transcriber.clone(),
        cleaner.clone(),
    ));
    let router = create_router(AppState { pipeline });

    TestHarness {
        downloader,
        transcriber,
        cleaner,
        router,
    }
}

fn post_transcribe(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transcribe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_returns_ok() {
    let h = harness(StubDownloader::default(), StubTranscriber::default());

    let response = h
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_missing_video_url_is_400_and_touches_no_stage() {
    for body in [json!({}), json!({"videoUrl": null}), json!({"videoUrl": ""})] {
        let h = harness(StubDownloader::default(), StubTranscriber::default());

        let response = h.router.clone().oneshot(post_transcribe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "videoUrl is required"})
        );
        assert_eq!(h.downloader.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.cleaner.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_success_returns_transcript_and_cleans_up_downloaded_path() {
    let h = harness(StubDownloader::default(), StubTranscriber::default());

    let response = h
        .router
        .clone()
        .oneshot(post_transcribe(
            json!({"videoUrl": "https://www.youtube.com/watch?v=test123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "language": "pt",
            "segments": [
                {"start": 0.0, "end": 5.0, "text": "Olá mundo"},
                {"start": 5.0, "end": 10.0, "text": "Teste de transcrição"},
            ]
        })
    );

    assert_eq!(h.cleaner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.cleaner.last_path.lock().unwrap().as_deref(),
        Some(Path::new(AUDIO_PATH))
    );
}

#[tokio::test]
async fn test_download_failure_is_500_with_cause_and_no_transcription() {
    let h = harness(
        StubDownloader {
            fail_with: Some("Erro ao baixar áudio".to_string()),
            ..Default::default()
        },
        StubTranscriber::default(),
    );

    let response = h
        .router
        .clone()
        .oneshot(post_transcribe(
            json!({"videoUrl": "https://www.youtube.com/watch?v=broken"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Erro ao baixar áudio"));

    assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.cleaner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transcription_failure_is_500_with_cause_and_single_cleanup() {
    let h = harness(
        StubDownloader::default(),
        StubTranscriber {
            fail_with: Some("Whisper API error: bad audio".to_string()),
            ..Default::default()
        },
    );

    let response = h
        .router
        .clone()
        .oneshot(post_transcribe(
            json!({"videoUrl": "https://www.youtube.com/watch?v=test123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("bad audio"));

    assert_eq!(h.downloader.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.cleaner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.cleaner.last_path.lock().unwrap().as_deref(),
        Some(Path::new(AUDIO_PATH))
    );
}

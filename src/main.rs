use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcribe_server::cleanup::FsCleaner;
use transcribe_server::cli::Cli;
use transcribe_server::config::Config;
use transcribe_server::downloader::{AudioDownloader, YtDlpDownloader};
use transcribe_server::pipeline::TranscriptionPipeline;
use transcribe_server::server::{create_router, AppState};
use transcribe_server::transcriber::{SpeechTranscriber, WhisperApiTranscriber};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transcribe_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    if config.openai.api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; transcription requests will fail");
    }

    let downloader = YtDlpDownloader::new(&config.scratch);
    if !downloader.check_availability().await {
        tracing::warn!("yt-dlp was not found on PATH; download requests will fail");
    }

    let downloader: Arc<dyn AudioDownloader> = Arc::new(downloader);
    let transcriber: Arc<dyn SpeechTranscriber> =
        Arc::new(WhisperApiTranscriber::new(&config.openai));
    let pipeline = Arc::new(TranscriptionPipeline::new(
        downloader,
        transcriber,
        Arc::new(FsCleaner),
    ));

    let router = create_router(AppState { pipeline });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

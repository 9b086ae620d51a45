use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "transcribe-server",
    about = "HTTP service that downloads a video's audio with yt-dlp and transcribes it via the OpenAI Whisper API",
    version
)]
pub struct Cli {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to a YAML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for temporary audio files (overrides the config file)
    #[arg(long, env = "SCRATCH_DIR", value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,
}

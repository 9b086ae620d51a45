use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Build a collision-free basename for a scratch audio file.
///
/// Combines a UTC timestamp with a random disambiguator so concurrent
/// requests can never race on the same path. The extension is appended
/// later, once yt-dlp has converted the audio.
pub fn scratch_audio_basename() -> String {
    format!(
        "audio_{}_{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        &Uuid::new_v4().to_string()[..8]
    )
}

/// Scratch path (without extension) for a new download.
pub fn scratch_audio_path(scratch_dir: &Path) -> PathBuf {
    scratch_dir.join(scratch_audio_basename())
}

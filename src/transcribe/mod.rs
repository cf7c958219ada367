pub mod whisper;

pub use whisper::WhisperClient;

use crate::error::{PolysubError, Result};
use crate::subtitle::SubtitleTrack;
use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into a timed subtitle track.
    async fn transcribe(&self, audio: &Path) -> Result<SubtitleTrack>;

    fn name(&self) -> &'static str;
}

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg").arg("-version").output().map_err(|e| {
        PolysubError::AudioExtraction(format!(
            "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(PolysubError::AudioExtraction(
            "FFmpeg check failed".to_string(),
        ));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Extract one audio track from a video file as mono 16 kHz WAV, the input
/// speech-recognition models expect.
pub fn extract_audio_track(video: &Path, stream_index: usize, output: &Path) -> Result<()> {
    check_ffmpeg()?;

    if !video.exists() {
        return Err(PolysubError::FileNotFound(video.display().to_string()));
    }

    info!(
        "Extracting audio track {} from {}",
        stream_index,
        video.display()
    );

    let status = Command::new("ffmpeg")
        .arg("-i")
        .arg(video)
        .args(["-map", &format!("0:a:{}", stream_index)])
        .args(["-acodec", "pcm_s16le", "-ac", "1", "-ar", "16000"])
        .arg("-y")
        .arg(output)
        .output()
        .map_err(|e| PolysubError::AudioExtraction(format!("Failed to run FFmpeg: {e}")))?;

    if !status.status.success() {
        let stderr = String::from_utf8_lossy(&status.stderr);
        return Err(PolysubError::AudioExtraction(format!(
            "FFmpeg failed: {}",
            stderr.trim()
        )));
    }

    debug!("Audio extracted to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extract_missing_video_fails() {
        let result = extract_audio_track(
            &PathBuf::from("/nonexistent/video.mkv"),
            0,
            &PathBuf::from("/tmp/out.wav"),
        );

        assert!(result.is_err());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Video frame capture for course thumbnails.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::UploadError;

/// Captures a single JPEG frame from a video.
#[async_trait]
pub trait FrameGrabber: Send + Sync {
    async fn grab_frame(&self, video: &Path, at: Duration) -> Result<Vec<u8>, UploadError>;
}

/// Frame capture through an `ffmpeg` subprocess writing JPEG to stdout.
#[derive(Debug, Clone)]
pub struct FfmpegFrameGrabber {
    program: String,
}

impl Default for FfmpegFrameGrabber {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegFrameGrabber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl FrameGrabber for FfmpegFrameGrabber {
    async fn grab_frame(&self, video: &Path, at: Duration) -> Result<Vec<u8>, UploadError> {
        let offset = format!("{:.3}", at.as_secs_f64());
        let output = Command::new(&self.program)
            .args(["-v", "error", "-ss", &offset, "-i"])
            .arg(video)
            .args(["-frames:v", "1", "-f", "image2", "-c:v", "mjpeg", "pipe:1"])
            .output()
            .await
            .map_err(|e| UploadError::Thumbnail(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UploadError::Thumbnail(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(UploadError::Thumbnail("no frame produced".to_string()));
        }

        debug!(video = %video.display(), bytes = output.stdout.len(), "Captured thumbnail frame");
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_a_thumbnail_error() {
        let grabber = FfmpegFrameGrabber::new("/nonexistent/ffmpeg");
        let err = grabber
            .grab_frame(Path::new("lecture.mp4"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Thumbnail(_)));
    }
}

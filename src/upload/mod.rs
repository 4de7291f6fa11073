// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Uploads to object storage through pre-signed PUT URLs.
//!
//! The backend issues a time-limited `uploadUrl` and the `publicUrl` the
//! object will be served from. The public URL is only handed out once the
//! storage PUT has succeeded.

mod thumbnail;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::graphql::{GraphQlError, UniversityApi};
use crate::models::CreateUploadUrlInput;

pub use thumbnail::{FfmpegFrameGrabber, FrameGrabber};

/// Offset into the video at which the thumbnail frame is taken.
pub const THUMBNAIL_OFFSET: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to read upload source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid upload path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Api(#[from] GraphQlError),

    #[error("Upload request failed: {0}")]
    Request(String),

    /// Storage answered the PUT with a non-2xx status.
    #[error("Upload failed with status {status}")]
    Storage { status: u16 },

    #[error("Thumbnail capture failed: {0}")]
    Thumbnail(String),
}

/// Result of [`Uploader::upload_video_with_thumbnail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpload {
    pub video_url: String,
    pub thumbnail_url: Option<String>,
}

/// MIME type for an upload, from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "ogv" => "video/ogg",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub struct Uploader {
    api: UniversityApi,
    http: Client,
    grabber: Arc<dyn FrameGrabber>,
}

impl Uploader {
    pub fn new(api: UniversityApi, timeout: Duration) -> Result<Self, UploadError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api,
            http,
            grabber: Arc::new(FfmpegFrameGrabber::default()),
        })
    }

    /// Replace the thumbnail frame source.
    pub fn with_frame_grabber(mut self, grabber: Arc<dyn FrameGrabber>) -> Self {
        self.grabber = grabber;
        self
    }

    /// Upload a local file and return its public URL.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<String, UploadError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| UploadError::InvalidPath(path.display().to_string()))?;

        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(file_name, content_type_for(path), bytes).await
    }

    /// Upload `bytes` as `file_name` and return the public URL.
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        let size = bytes.len();
        let target = self
            .api
            .generate_upload_url(&CreateUploadUrlInput {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
            })
            .await?;

        let response = self
            .http
            .put(&target.upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(file_name = %file_name, key = %target.key, status = status.as_u16(), "Storage rejected upload");
            return Err(UploadError::Storage {
                status: status.as_u16(),
            });
        }

        info!(file_name = %file_name, key = %target.key, bytes = size, "Upload complete");
        Ok(target.public_url)
    }

    /// Upload a video, then a JPEG frame from it as its thumbnail.
    ///
    /// A failed thumbnail is logged and reported as `None`; it never fails
    /// the video upload.
    pub async fn upload_video_with_thumbnail(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<VideoUpload, UploadError> {
        let path = path.as_ref();
        let video_url = self.upload_file(path).await?;

        let thumbnail_url = match self.upload_thumbnail(path).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Thumbnail skipped");
                None
            }
        };

        Ok(VideoUpload {
            video_url,
            thumbnail_url,
        })
    }

    async fn upload_thumbnail(&self, video: &Path) -> Result<String, UploadError> {
        let frame = self.grabber.grab_frame(video, THUMBNAIL_OFFSET).await?;
        self.upload_bytes(&thumbnail_name(video), "image/jpeg", frame)
            .await
    }
}

/// `thumb_<name>.jpg`, where `<name>` is the video file name up to its
/// first dot.
fn thumbnail_name(video: &Path) -> String {
    let name = video
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or("video");
    format!("thumb_{name}.jpg")
}

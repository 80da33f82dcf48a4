// src/capture.rs
use crate::errors::CaptureError;
use crate::models::EncodedImagePayload;
use crate::services::ImageProcessor;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Something that can hand over one still image: a camera, a file picker,
/// or a file on disk.
pub trait ImageSource: Send + Sync {
    fn capture(&self) -> Result<Vec<u8>, CaptureError>;
}

pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileImageSource {
    fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(format!("{}: {}", self.path.display(), e))
            }
            _ => CaptureError::CaptureFailed(format!("{}: {}", self.path.display(), e)),
        })
    }
}

/// An image already held in memory, e.g. handed over by a picker.
pub struct BytesImageSource(pub Vec<u8>);

impl ImageSource for BytesImageSource {
    fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        if self.0.is_empty() {
            return Err(CaptureError::CaptureFailed("no image selected".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Captures one image and turns it into an upload payload. Decoding and
/// resizing are CPU bound; async callers should run this on a blocking
/// thread.
pub fn capture_payload(
    source: &dyn ImageSource,
    processor: &ImageProcessor,
) -> Result<EncodedImagePayload, CaptureError> {
    let raw = source.capture()?;
    processor.prepare_for_upload(&raw)
}

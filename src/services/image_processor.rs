// src/services/image_processor.rs
use crate::errors::CaptureError;
use crate::models::EncodedImagePayload;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView, ImageFormat as ImgFormat, io::Reader as ImageReader};
use std::io::Cursor;

/// Width the capture screen scales photos down to before upload.
pub const TARGET_UPLOAD_WIDTH: u32 = 800;
/// Largest still accepted for decoding, in pixels. Camera sensors sit well
/// below this.
pub const MAX_PIXELS: u64 = 200_000_000;

pub struct ImageProcessor {
    target_width: u32,
    max_pixels: u64,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor {
    pub fn new() -> Self {
        Self {
            target_width: TARGET_UPLOAD_WIDTH,
            max_pixels: MAX_PIXELS,
        }
    }

    pub fn with_target_width(target_width: u32) -> Self {
        Self {
            target_width: target_width.max(1),
            ..Self::new()
        }
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Reads the dimensions from the image header without decoding pixels.
    pub fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), CaptureError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CaptureError::Preprocess(format!("Invalid image format: {}", e)))?
            .into_dimensions()
            .map_err(|e| CaptureError::Preprocess(format!("Invalid image format: {}", e)))?;

        if u64::from(width) * u64::from(height) > self.max_pixels {
            return Err(CaptureError::Preprocess(format!(
                "Image of {}x{} exceeds {} pixels",
                width, height, self.max_pixels
            )));
        }

        Ok((width, height))
    }

    /// Scales `data` down to the target width, re-encodes it as JPEG and
    /// base64 encodes the result.
    pub fn prepare_for_upload(&self, data: &[u8]) -> Result<EncodedImagePayload, CaptureError> {
        self.dimensions(data)?;
        let img = image::load_from_memory(data)
            .map_err(|e| CaptureError::Preprocess(format!("Failed to load image: {}", e)))?;

        let resized = self.resize_to_target(img);

        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        let mut output = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut output), ImgFormat::Jpeg)
            .map_err(|e| {
                CaptureError::Preprocess(format!("Failed to encode resized image: {}", e))
            })?;

        Ok(EncodedImagePayload::jpeg(
            general_purpose::STANDARD.encode(&output),
        ))
    }

    fn resize_to_target(&self, img: DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width <= self.target_width {
            return img;
        }

        let ratio = self.target_width as f32 / width as f32;
        let new_height = ((height as f32 * ratio).round() as u32).max(1);

        img.resize_exact(
            self.target_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([0x11, 0x22, 0x33]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImgFormat::Png)
            .unwrap();
        out
    }

    fn decode(payload: &EncodedImagePayload) -> DynamicImage {
        let bytes = general_purpose::STANDARD.decode(&payload.data).unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn wide_images_are_scaled_to_target_width() {
        let processor = ImageProcessor::new();
        let payload = processor.prepare_for_upload(&png(1600, 1200)).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(decode(&payload).dimensions(), (800, 600));
    }

    #[test]
    fn narrow_images_keep_their_size() {
        let processor = ImageProcessor::with_target_width(800);
        let payload = processor.prepare_for_upload(&png(320, 240)).unwrap();
        assert_eq!(decode(&payload).dimensions(), (320, 240));
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let err = ImageProcessor::new()
            .prepare_for_upload(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, CaptureError::Preprocess(_)));
    }

    #[test]
    fn camera_sized_stills_are_scaled_not_rejected() {
        let payload = ImageProcessor::new().prepare_for_upload(&png(5000, 100)).unwrap();
        assert_eq!(decode(&payload).dimensions(), (800, 16));
    }

    #[test]
    fn pixel_cap_rejects_before_decoding() {
        let processor = ImageProcessor::new().with_max_pixels(100);
        assert_eq!(processor.dimensions(&png(10, 10)).unwrap(), (10, 10));
        let err = processor.prepare_for_upload(&png(20, 20)).unwrap_err();
        assert!(matches!(err, CaptureError::Preprocess(_)));
    }
}

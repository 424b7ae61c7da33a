//! Pure Rust backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `DynamicImage::save`, format from the output extension |
//!
//! SVG and JPEG XL have no decoder here; those sources fail with
//! [`BackendError::Unsupported`]. Use the ImageMagick backend for them.

use super::backend::{BackendError, ImageBackend};
use super::params::{ThumbnailParams, scaled_width};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;

/// Extensions whose decoders are compiled in.
const DECODABLE: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn can_decode(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| DECODABLE.iter().any(|d| e.eq_ignore_ascii_case(d)))
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    if !RustBackend::can_decode(path) {
        return Err(BackendError::Unsupported(path.to_path_buf()));
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

impl ImageBackend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let width = scaled_width(img.dimensions(), params.height);
        let resized = img.resize_exact(width, params.height, FilterType::Lanczos3);
        resized.save(&params.output).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to write {}: {}",
                params.output.display(),
                e
            ))
        })
    }
}

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. Backends receive them and
//! do the pixel work, which keeps the walk testable with a mock backend.

use std::path::PathBuf;

/// A fixed-height, aspect-preserving resize of `source` into `output`.
///
/// The output format follows the extension of `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target height in pixels. Width follows the source aspect ratio.
    pub height: u32,
}

/// Width that keeps `(width, height)` proportional at `target_height`.
///
/// Never returns zero, so extreme panoramas still yield a valid image.
pub fn scaled_width(source: (u32, u32), target_height: u32) -> u32 {
    let (width, height) = source;
    if height == 0 {
        return 1;
    }
    let scaled = (width as f64 * target_height as f64 / height as f64).round() as u32;
    scaled.max(1)
}

//! Thumbnail rendering.
//!
//! | Backend | How | Inputs |
//! |---|---|---|
//! | [`MagickBackend`] | `magick <src> -resize x<height> <out>` | anything ImageMagick reads, incl. SVG and JPEG XL |
//! | [`RustBackend`] | `image` crate, Lanczos3 | JPEG, PNG, WebP |
//!
//! The module is split into:
//! - **Parameters**: [`ThumbnailParams`], a description of one resize
//! - **Backend**: [`ImageBackend`] trait and the shared error type
//! - **Implementations**: one file per backend

pub mod backend;
pub mod magick_backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use magick_backend::MagickBackend;
pub use params::{ThumbnailParams, scaled_width};
pub use rust_backend::RustBackend;

use crate::config::{BackendKind, ThumbnailsConfig};

/// Instantiate the backend selected in the config.
pub fn backend_for(thumbnails: &ThumbnailsConfig) -> Box<dyn ImageBackend> {
    match thumbnails.backend {
        BackendKind::Magick => Box::new(MagickBackend::with_program(&thumbnails.magick_program)),
        BackendKind::Rust => Box::new(RustBackend::new()),
    }
}

//! Thumbnail materialization.
//!
//! Every `NewOrChanged` event gets one thumbnail at a stable path derived from
//! the revision's normalized version and the original file name:
//!
//! ```text
//! <output>/<dir>/<version>/<file-name>.<format>
//! dist/backgrounds/2.28.0/adwaita-day.jpg.png
//! ```
//!
//! Keeping the original extension in the name means two formats of the same
//! stem never collide. Thumbnails that already exist are left alone unless
//! regeneration is forced, which makes reruns cheap.

use crate::imaging::{BackendError, ImageBackend, ThumbnailParams};
use std::path::{Path, PathBuf};

/// What [`materialize`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Skipped,
}

/// Output-root-relative thumbnail path as it appears in the HTML report.
pub fn thumbnail_rel_path(dir: &str, revision: &str, file_name: &str, format: &str) -> String {
    format!("{dir}/{revision}/{file_name}.{format}")
}

/// Absolute thumbnail path under `output_root`.
pub fn thumbnail_path(
    output_root: &Path,
    dir: &str,
    revision: &str,
    file_name: &str,
    format: &str,
) -> PathBuf {
    output_root
        .join(dir)
        .join(revision)
        .join(format!("{file_name}.{format}"))
}

/// Render `source` into `target` unless it is already there.
///
/// Any backend failure is returned as-is; the caller aborts the run.
pub fn materialize(
    backend: &dyn ImageBackend,
    source: &Path,
    target: &Path,
    height: u32,
    force: bool,
) -> Result<Outcome, BackendError> {
    if target.exists() && !force {
        return Ok(Outcome::Skipped);
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    backend.thumbnail(&ThumbnailParams {
        source: source.to_path_buf(),
        output: target.to_path_buf(),
        height,
    })?;
    Ok(Outcome::Created)
}

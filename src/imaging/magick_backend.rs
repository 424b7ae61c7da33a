//! ImageMagick backend.
//!
//! Shells out to `magick` once per thumbnail. `-resize x<height>` scales to
//! the given height and keeps the aspect ratio; the output format follows the
//! output file's extension. A non-zero exit aborts the run.

use super::backend::{BackendError, ImageBackend};
use super::params::ThumbnailParams;
use crate::tool;
use std::process::Command;

pub struct MagickBackend {
    program: String,
}

impl MagickBackend {
    pub fn new() -> Self {
        Self::with_program("magick")
    }

    /// Use a different binary, e.g. `convert` from ImageMagick 6.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn command(&self, params: &ThumbnailParams) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&params.source)
            .arg("-resize")
            .arg(format!("x{}", params.height))
            .arg(&params.output);
        cmd
    }
}

impl Default for MagickBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for MagickBackend {
    fn name(&self) -> &'static str {
        "magick"
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        tool::run(&mut self.command(params))?;
        Ok(())
    }
}

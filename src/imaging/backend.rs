//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single operation the walk needs: render a
//! thumbnail. Production code picks [`MagickBackend`](super::MagickBackend) or
//! [`RustBackend`](super::RustBackend); tests use the recording mock below.

use super::params::ThumbnailParams;
use crate::tool::ToolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("Unsupported input format: {0}")]
    Unsupported(PathBuf),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for thumbnail backends.
pub trait ImageBackend: Sync {
    /// Short name for progress output.
    fn name(&self) -> &'static str;

    /// Resize `params.source` to `params.height` pixels high and write it to
    /// `params.output`. The parent directory already exists.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations instead of touching pixels.
    ///
    /// Writes an empty file at the output path so existence checks behave like
    /// they would after a real run.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<ThumbnailParams>>,
        /// Source file names that make the backend fail.
        pub fail_on: Vec<String>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(file_name: &str) -> Self {
            Self {
                operations: Mutex::new(Vec::new()),
                fail_on: vec![file_name.to_string()],
            }
        }

        pub fn get_operations(&self) -> Vec<ThumbnailParams> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(params.clone());
            let name = params
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if self.fail_on.contains(&name) {
                return Err(BackendError::Tool(ToolError::Failed {
                    command: format!("magick {}", params.source.display()),
                    status: "exit status: 1".to_string(),
                    stderr: "no decode delegate for this image format".to_string(),
                }));
            }
            std::fs::write(&params.output, b"")?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_thumbnail() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new();
        let params = ThumbnailParams {
            source: "/repo/bg/a.jpg".into(),
            output: tmp.path().join("a.jpg.png"),
            height: 400,
        };
        backend.thumbnail(&params).unwrap();

        assert_eq!(backend.get_operations(), vec![params.clone()]);
        assert!(params.output.exists());
    }

    #[test]
    fn mock_can_fail() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::failing_on("broken.svg");
        let result = backend.thumbnail(&ThumbnailParams {
            source: "/repo/bg/broken.svg".into(),
            output: tmp.path().join("broken.svg.png"),
            height: 400,
        });
        assert!(matches!(result, Err(BackendError::Tool(_))));
    }
}

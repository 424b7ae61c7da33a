//! Which files in the source repository count as background assets.
//!
//! The same filter is applied to the name-only diff between two tags and to
//! the listing of the checked-out tree, so "changed" and "present" always agree
//! on what an asset is.

use crate::config::SourceConfig;
use std::collections::BTreeSet;

/// Extension allow-list plus path skip patterns.
#[derive(Debug, Clone)]
pub struct AssetFilter {
    extensions: Vec<String>,
    skip: Vec<String>,
}

impl AssetFilter {
    pub fn new(extensions: &[String], skip: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            skip: skip.iter().filter(|s| !s.is_empty()).cloned().collect(),
        }
    }

    pub fn from_config(source: &SourceConfig) -> Self {
        Self::new(&source.extensions, &source.skip)
    }

    /// True when `path` has an allowed extension and matches no skip pattern.
    pub fn accepts(&self, path: &str) -> bool {
        let Some(ext) = extension(path) else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
            && !self.skip.iter().any(|pattern| path.contains(pattern.as_str()))
    }

    /// Keep accepted paths. The result is sorted, whatever the input order.
    pub fn filter_paths<I, S>(&self, paths: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .filter(|p| self.accepts(p.as_ref()))
            .map(|p| p.as_ref().to_string())
            .collect()
    }
}

/// One asset file of the checked-out tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssetFile {
    /// Repository-relative path with `/` separators.
    pub path: String,
}

impl AssetFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Extension of the last path component, if it has one.
fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    (!ext.is_empty()).then_some(ext)
}

//! Collect stage: walk the tag history and build the [`Collection`].
//!
//! ```text
//! tags → parse + sort → for each consecutive (a, b):
//!     checkout b → diff a..b → list tree → IndexBuilder::record → thumbnails
//! ```
//!
//! The first tag is only the baseline of the first diff and never becomes a
//! column. All repository and image-tool calls are synchronous; the working
//! tree is checked out in place, so there is exactly one revision in flight.
//!
//! Progress is reported through an optional channel of [`WalkEvent`]s, which
//! the CLI drains on a printer thread.

use crate::assets::{AssetFile, AssetFilter};
use crate::classify::Classifier;
use crate::config::Config;
use crate::imaging::{BackendError, ImageBackend};
use crate::index::{Collection, IndexBuilder};
use crate::repo::{RepoError, SourceRepo};
use crate::thumbnails::{self, Outcome};
use crate::version::{Revision, VersionError, sort_revisions};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error("Thumbnail for {source_path} failed: {source}")]
    Thumbnail {
        source_path: String,
        #[source]
        source: BackendError,
    },
    #[error("Tags {first} and {second} both normalize to version {version}")]
    DuplicateVersion {
        version: String,
        first: String,
        second: String,
    },
    #[error("Output directory {output} lies inside the source checkout {repo}")]
    OutputInsideRepo { output: PathBuf, repo: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One thumbnail handled during a revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailInfo {
    pub identifier: String,
    pub file_name: String,
    pub outcome: Outcome,
}

/// Progress reported while walking.
#[derive(Debug, Clone)]
pub enum WalkEvent {
    /// Tags were listed and sorted; `baseline` is only diffed against.
    Started {
        baseline: String,
        transitions: usize,
        /// Name of the thumbnail backend in use.
        backend: String,
    },
    /// One transition was recorded.
    RevisionProcessed {
        index: usize,
        total: usize,
        tag: String,
        version: String,
        /// False when nothing changed and the revision gets no column.
        included: bool,
        thumbnails: Vec<ThumbnailInfo>,
        dittos: usize,
        collisions: Vec<String>,
    },
}

/// Counters over a whole walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub transitions: usize,
    pub columns: usize,
    pub created: usize,
    pub skipped: usize,
}

impl fmt::Display for WalkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} revisions with changes, {} thumbnails created, {} existing",
            self.columns, self.transitions, self.created, self.skipped
        )
    }
}

pub struct CollectResult {
    pub collection: Collection,
    pub stats: WalkStats,
}

/// All tags, parsed and sorted ascending.
///
/// One malformed tag aborts, and so do two tags with the same version: they
/// would share a column and a thumbnail directory.
pub fn list_revisions(repo: &dyn SourceRepo, prefixes: &[String]) -> Result<Vec<Revision>, WalkError> {
    let mut revisions = repo
        .list_tags()?
        .iter()
        .map(|tag| Revision::from_tag(tag, prefixes))
        .collect::<Result<Vec<_>, _>>()?;
    sort_revisions(&mut revisions);
    if let Some(pair) = revisions.windows(2).find(|p| p[0].version == p[1].version) {
        return Err(WalkError::DuplicateVersion {
            version: pair[0].key(),
            first: pair[0].tag.clone(),
            second: pair[1].tag.clone(),
        });
    }
    Ok(revisions)
}

/// Refuse an output root inside the checkout; generated thumbnails would
/// show up in the tree listing as assets.
pub fn ensure_output_outside(repo_root: &Path, output_root: &Path) -> Result<(), WalkError> {
    let repo = resolve(repo_root)?;
    let output = resolve(output_root)?;
    if output.starts_with(&repo) {
        return Err(WalkError::OutputInsideRepo { output, repo });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and append the rest,
/// so not-yet-created output directories compare like existing ones.
fn resolve(path: &Path) -> Result<PathBuf, std::io::Error> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = std::fs::canonicalize(existing) {
            return Ok(missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    Ok(absolute)
}

/// Asset paths that differ between two tags, filtered and sorted.
pub fn diff(
    repo: &dyn SourceRepo,
    filter: &AssetFilter,
    from: &Revision,
    to: &Revision,
) -> Result<BTreeSet<String>, WalkError> {
    Ok(filter.filter_paths(repo.diff_names(&from.tag, &to.tag)?))
}

/// Assets of the currently checked-out tree, in path order.
pub fn list_assets(repo: &dyn SourceRepo, filter: &AssetFilter) -> Result<Vec<AssetFile>, WalkError> {
    Ok(filter
        .filter_paths(repo.list_files()?)
        .into_iter()
        .map(AssetFile::new)
        .collect())
}

/// Walk every consecutive tag pair and materialize thumbnails under
/// `output_root`.
pub fn collect(
    repo: &dyn SourceRepo,
    backend: &dyn ImageBackend,
    config: &Config,
    output_root: &Path,
    events: Option<Sender<WalkEvent>>,
) -> Result<CollectResult, WalkError> {
    let emit = |event: WalkEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is listening anymore
            let _ = tx.send(event);
        }
    };

    ensure_output_outside(repo.root(), output_root)?;
    let revisions = list_revisions(repo, &config.source.tag_prefixes)?;
    let filter = AssetFilter::from_config(&config.source);
    let mut builder = IndexBuilder::new(Classifier::new(&config.classify.aliases));
    let mut stats = WalkStats {
        transitions: revisions.len().saturating_sub(1),
        ..WalkStats::default()
    };

    if let Some(first) = revisions.first() {
        emit(WalkEvent::Started {
            baseline: first.tag.clone(),
            transitions: stats.transitions,
            backend: backend.name().to_string(),
        });
    }

    for (i, pair) in revisions.windows(2).enumerate() {
        let (from, to) = (&pair[0], &pair[1]);
        repo.checkout(&to.tag)?;
        let changed = diff(repo, &filter, from, to)?;
        let listing = list_assets(repo, &filter)?;
        let record = builder.record(to, &changed, &listing);

        let version = to.key();
        let mut handled = Vec::with_capacity(record.new_assets.len());
        for asset in &record.new_assets {
            let source = repo.root().join(&asset.source_path);
            let target = thumbnails::thumbnail_path(
                output_root,
                &config.thumbnails.dir,
                &version,
                &asset.file_name,
                &config.thumbnails.format,
            );
            let outcome = thumbnails::materialize(
                backend,
                &source,
                &target,
                config.thumbnails.height,
                config.thumbnails.force,
            )
            .map_err(|source| WalkError::Thumbnail {
                source_path: asset.source_path.clone(),
                source,
            })?;
            match outcome {
                Outcome::Created => stats.created += 1,
                Outcome::Skipped => stats.skipped += 1,
            }
            handled.push(ThumbnailInfo {
                identifier: asset.identifier.clone(),
                file_name: asset.file_name.clone(),
                outcome,
            });
        }

        if record.has_changes() {
            stats.columns += 1;
        }
        emit(WalkEvent::RevisionProcessed {
            index: i + 1,
            total: stats.transitions,
            tag: to.tag.clone(),
            version,
            included: record.has_changes(),
            thumbnails: handled,
            dittos: record.dittos,
            collisions: record.collisions,
        });
    }

    Ok(CollectResult {
        collection: builder.finish(),
        stats,
    })
}

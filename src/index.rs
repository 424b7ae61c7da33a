//! Per-identifier event logs across revisions.
//!
//! The [`IndexBuilder`] is fed one revision transition at a time: the set of
//! asset paths that changed since the previous tag, and the full listing of
//! assets present in the checked-out tree. For every identifier present it
//! records either a [`AssetEvent::NewOrChanged`] (one of its files changed) or
//! an [`AssetEvent::Ditto`] (it is still there, unchanged).
//!
//! A revision in which nothing changed records nothing at all and does not
//! become a column of the report.
//!
//! The builder does no I/O. The walk owns it, feeds it, and takes the finished
//! [`Collection`] out of it with [`IndexBuilder::finish`].

use crate::assets::AssetFile;
use crate::classify::Classifier;
use crate::version::Revision;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What happened to one identifier at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetEvent {
    /// A file of this identifier was added or modified.
    NewOrChanged {
        /// Normalized version of the revision (`2.28.0`).
        revision: String,
        /// Original file name, also the thumbnail's base name.
        file_name: String,
        /// Repository-relative path at that revision.
        source_path: String,
    },
    /// The identifier exists unchanged since its previous appearance.
    Ditto { revision: String },
}

impl AssetEvent {
    pub fn revision(&self) -> &str {
        match self {
            AssetEvent::NewOrChanged { revision, .. } | AssetEvent::Ditto { revision } => revision,
        }
    }

    pub fn is_ditto(&self) -> bool {
        matches!(self, AssetEvent::Ditto { .. })
    }
}

/// Identifier → events in revision order.
pub type Index = BTreeMap<String, Vec<AssetEvent>>;

/// Everything the collect stage hands to the render stage.
///
/// Written to `index.json` in the output root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Revisions with at least one new or changed asset, ascending.
    pub revisions: Vec<Revision>,
    pub index: Index,
}

/// A newly recorded asset whose thumbnail needs to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub identifier: String,
    pub source_path: String,
    pub file_name: String,
}

/// Outcome of recording one revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionRecord {
    pub new_assets: Vec<NewAsset>,
    pub dittos: usize,
    /// Changed paths dropped because another changed file of the same
    /// identifier already represents it at this revision.
    pub collisions: Vec<String>,
}

impl RevisionRecord {
    pub fn has_changes(&self) -> bool {
        !self.new_assets.is_empty()
    }
}

enum Staged {
    Changed(AssetFile),
    Ditto,
}

/// Accumulates the [`Index`] and the list of revisions worth a column.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    classifier: Classifier,
    index: Index,
    revisions: Vec<Revision>,
}

impl IndexBuilder {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            index: Index::new(),
            revisions: Vec::new(),
        }
    }

    /// Record the transition into `revision`.
    ///
    /// `changed` holds the repository-relative paths that differ from the
    /// previous tag; `listing` is every asset present at `revision`. Both are
    /// expected to be filtered already.
    pub fn record(
        &mut self,
        revision: &Revision,
        changed: &BTreeSet<String>,
        listing: &[AssetFile],
    ) -> RevisionRecord {
        // Canonical order, so the directory walk order never leaks into the index
        let files: BTreeSet<&AssetFile> = listing.iter().collect();

        let mut record = RevisionRecord::default();
        let mut staged: BTreeMap<String, Staged> = BTreeMap::new();
        let mut has_changes = false;
        let mut deferred: Vec<String> = Vec::new();

        for file in files {
            let identifier = self.classifier.classify(file.file_name());
            if changed.contains(&file.path) {
                has_changes = true;
                match staged.get(&identifier) {
                    Some(Staged::Changed(_)) => record.collisions.push(file.path.clone()),
                    _ => {
                        staged.insert(identifier, Staged::Changed(file.clone()));
                    }
                }
            } else if has_changes {
                staged.entry(identifier).or_insert(Staged::Ditto);
            } else {
                deferred.push(identifier);
            }
        }

        if !has_changes {
            return RevisionRecord::default();
        }
        for identifier in deferred {
            staged.entry(identifier).or_insert(Staged::Ditto);
        }

        let key = revision.key();
        for (identifier, entry) in staged {
            let event = match entry {
                Staged::Changed(file) => {
                    let file_name = file.file_name().to_string();
                    record.new_assets.push(NewAsset {
                        identifier: identifier.clone(),
                        source_path: file.path.clone(),
                        file_name: file_name.clone(),
                    });
                    AssetEvent::NewOrChanged {
                        revision: key.clone(),
                        file_name,
                        source_path: file.path,
                    }
                }
                Staged::Ditto => {
                    record.dittos += 1;
                    AssetEvent::Ditto {
                        revision: key.clone(),
                    }
                }
            };
            self.index.entry(identifier).or_default().push(event);
        }

        self.revisions.push(revision.clone());
        record
    }

    pub fn finish(self) -> Collection {
        Collection {
            revisions: self.revisions,
            index: self.index,
        }
    }
}

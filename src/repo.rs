//! Access to the tagged source repository.
//!
//! [`SourceRepo`] is the narrow capability the walk needs: list tags, check a
//! tag out, diff two tags by name, and list the files of the checked-out tree.
//! [`GitRepo`] is the real implementation on top of the `git` binary; tests use
//! an in-memory repository instead.
//!
//! Checking out a tag mutates the working tree in place. After
//! [`SourceRepo::checkout`] returns, the tree reflects that tag and nothing
//! else, so revisions can only ever be processed one at a time.

use crate::tool::{self, ToolError};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Repository not found: {0}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("Walking the working tree failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Capability interface over the source repository.
pub trait SourceRepo {
    /// Root of the working tree; listed paths are relative to it.
    fn root(&self) -> &Path;

    /// All tag names, in no particular order.
    fn list_tags(&self) -> Result<Vec<String>, RepoError>;

    /// Replace the working tree with the contents of `tag`.
    fn checkout(&self, tag: &str) -> Result<(), RepoError>;

    /// Paths that differ between two tags (added, modified, or removed).
    fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, RepoError>;

    /// Every file of the checked-out tree, `/`-separated and relative to
    /// [`root`](SourceRepo::root).
    fn list_files(&self) -> Result<Vec<String>, RepoError>;
}

/// A git checkout driven through the `git` command-line tool.
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn open(root: &Path) -> Result<Self, RepoError> {
        if !root.is_dir() {
            return Err(RepoError::NotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// `git` in the repository directory. Paths are printed unquoted.
    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.root)
            .args(["-c", "core.quotePath=false"]);
        cmd
    }
}

impl SourceRepo for GitRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self) -> Result<Vec<String>, RepoError> {
        Ok(tool::run_lines(self.git().args(["tag", "--list"]))?)
    }

    fn checkout(&self, tag: &str) -> Result<(), RepoError> {
        tool::run(
            self.git()
                .args(["checkout", "--quiet"])
                .arg(format!("tags/{tag}")),
        )?;
        Ok(())
    }

    fn diff_names(&self, from: &str, to: &str) -> Result<Vec<String>, RepoError> {
        Ok(tool::run_nul(
            self.git()
                .args(["diff", "--name-only", "-z"])
                .arg(format!("tags/{from}"))
                .arg(format!("tags/{to}")),
        )?)
    }

    fn list_files(&self) -> Result<Vec<String>, RepoError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                files.push(to_slash(rel));
            }
        }
        Ok(files)
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

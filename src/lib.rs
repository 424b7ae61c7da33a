//! # bg-timeline
//!
//! Renders the history of a background-image repository as one static HTML
//! grid: a column per tagged release, a row per background, and a thumbnail
//! wherever a background was added or changed.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Collect   git tags  →  index.json + backgrounds/<version>/*.png
//! 2. Render    index.json  →  index.html
//! ```
//!
//! The collect stage is the expensive one: it checks out every tag in place,
//! diffs it against its predecessor and renders thumbnails through an external
//! tool. Its result is plain JSON, so the report can be re-rendered (new
//! styling, different link template) without touching the repository again.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`version`] | Tag → sortable [`version::VersionKey`], and the [`version::Revision`] type |
//! | [`repo`] | [`repo::SourceRepo`] capability over the git checkout |
//! | [`assets`] | Extension allow-list and skip patterns |
//! | [`classify`] | File name → row identifier, with the rename alias table |
//! | [`index`] | Per-identifier event log built one revision at a time |
//! | [`walk`] | Stage 1: drives repo, index builder and thumbnails |
//! | [`thumbnails`] | Stable thumbnail paths and skip-if-present materialization |
//! | [`imaging`] | Thumbnail backends: ImageMagick or the `image` crate |
//! | [`render`] | Stage 2: grid layout and Maud templates |
//! | [`config`] | `config.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//! | [`tool`] | Blocking invocation of external commands |
//!
//! # Design Decisions
//!
//! ## Events, Not Strings
//!
//! Each identifier's history is a list of [`index::AssetEvent`]s: either a new
//! or changed file, or a "ditto" marking that it is still present unchanged.
//! The renderer folds dittos into the span of the preceding tile, so a
//! background that lived through ten releases is one wide tile.
//!
//! ## Only Changing Releases Are Columns
//!
//! A release that touched no background contributes nothing to the grid, not
//! even dittos. This keeps the timeline dense; the tag list of a long-lived
//! repository is mostly translation and build-system releases.
//!
//! ## Capabilities at the Edges
//!
//! Git and the image tool sit behind [`repo::SourceRepo`] and
//! [`imaging::ImageBackend`]. The walk is tested end to end against an
//! in-memory repository and a recording backend.

pub mod assets;
pub mod classify;
pub mod config;
pub mod imaging;
pub mod index;
pub mod output;
pub mod render;
pub mod repo;
pub mod thumbnails;
pub mod tool;
pub mod version;
pub mod walk;

//! Render stage: turn a [`Collection`] into the HTML timeline.
//!
//! ## Layout
//!
//! The page is one CSS grid with a column per revision on the axis. Each
//! identifier becomes a row that starts at the column of its first appearance
//! and is made of tiles:
//!
//! ```text
//!             3.2   3.4   3.6   3.8   3.10
//! blobs-d     [====== asset ======]  [asset]     NewOrChanged + 2 Ditto, NewOrChanged
//! wood-l            [asset] [ ]  [asset]         gap while the file was gone
//! ```
//!
//! A `NewOrChanged` event opens an asset tile, a `Ditto` widens the tile
//! before it, and a column with no event after the first appearance is an
//! empty tile. Trailing empty tiles are trimmed so rows end at their last
//! asset.
//!
//! ## Anomalies
//!
//! Some indexes cannot be laid out cleanly: a `Ditto` with nothing to extend,
//! an event for a revision that is not a column, or two events in one column.
//! These never fail the render. The row gets a broken tile or drops the event,
//! and an [`IndexAnomaly`] is returned for the caller to report.
//!
//! ## Files
//!
//! [`write_report`] writes `index.html`; [`write_collection`] and
//! [`read_collection`] handle `index.json`, the hand-off between the collect
//! and render stages.

use crate::config::{Config, ReportConfig, ThumbnailsConfig};
use crate::index::{AssetEvent, Collection};
use crate::thumbnails::thumbnail_rel_path;
use crate::version::Revision;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS_STATIC: &str = include_str!("../static/style.css");

pub const REPORT_FILE: &str = "index.html";
pub const COLLECTION_FILE: &str = "index.json";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Row model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileKind {
    /// Thumbnail linking to the file in the source repository.
    Asset { thumbnail: String, source_url: String },
    /// Placeholder for an identifier first seen as unchanged.
    Broken,
    /// The identifier is absent in this column.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    /// Number of columns the tile covers.
    pub span: usize,
}

impl Tile {
    fn new(kind: TileKind) -> Self {
        Self { kind, span: 1 }
    }
}

/// One identifier's row of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub identifier: String,
    /// Zero-based column of the first tile.
    pub first_column: usize,
    pub tiles: Vec<Tile>,
}

impl Row {
    /// Columns covered, the sum of all tile spans.
    pub fn width(&self) -> usize {
        self.tiles.iter().map(|t| t.span).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyKind {
    /// A `Ditto` with no asset tile before it.
    DittoWithoutTile,
    /// The event's revision is not a column of the report.
    UnknownRevision,
    /// The event's column already had an event, or lies before an earlier one.
    OutOfOrder,
}

/// A recoverable inconsistency found while laying out the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAnomaly {
    pub identifier: String,
    pub revision: String,
    pub kind: AnomalyKind,
}

impl fmt::Display for IndexAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AnomalyKind::DittoWithoutTile => write!(
                f,
                "{} is unchanged at {} but has no earlier thumbnail",
                self.identifier, self.revision
            ),
            AnomalyKind::UnknownRevision => write!(
                f,
                "{} has an event for {}, which is not a report column",
                self.identifier, self.revision
            ),
            AnomalyKind::OutOfOrder => write!(
                f,
                "{} has an out-of-order event for {}",
                self.identifier, self.revision
            ),
        }
    }
}

/// Builds the two URLs a tile needs from the config.
pub struct TileLinks<'a> {
    thumbnails: &'a ThumbnailsConfig,
    source_url: &'a str,
}

impl<'a> TileLinks<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            thumbnails: &config.thumbnails,
            source_url: &config.report.source_url,
        }
    }

    /// Output-relative thumbnail path.
    pub fn thumbnail(&self, revision: &str, file_name: &str) -> String {
        thumbnail_rel_path(
            &self.thumbnails.dir,
            revision,
            file_name,
            &self.thumbnails.format,
        )
    }

    /// Link into the source repository at `tag`.
    pub fn source(&self, tag: &str, path: &str, file_name: &str) -> String {
        self.source_url
            .replace("{tag}", tag)
            .replace("{path}", path)
            .replace("{file}", file_name)
    }
}

/// Lay out one identifier's events along the revision axis.
///
/// Returns `None` when no event lands on the axis. Anomalies are appended to
/// `anomalies`.
pub fn build_row(
    identifier: &str,
    events: &[AssetEvent],
    revisions: &[Revision],
    links: &TileLinks,
    anomalies: &mut Vec<IndexAnomaly>,
) -> Option<Row> {
    let columns: HashMap<String, usize> = revisions
        .iter()
        .enumerate()
        .map(|(i, r)| (r.key(), i))
        .collect();

    let mut anomaly = |event: &AssetEvent, kind: AnomalyKind| {
        anomalies.push(IndexAnomaly {
            identifier: identifier.to_string(),
            revision: event.revision().to_string(),
            kind,
        });
    };

    // Place every event on a column, keeping at most one per column
    let mut placed: Vec<(usize, &AssetEvent)> = Vec::with_capacity(events.len());
    for event in events {
        let Some(&column) = columns.get(event.revision()) else {
            anomaly(event, AnomalyKind::UnknownRevision);
            continue;
        };
        if placed.last().is_some_and(|(last, _)| column <= *last) {
            anomaly(event, AnomalyKind::OutOfOrder);
            continue;
        }
        placed.push((column, event));
    }

    let (first_column, _) = *placed.first()?;
    let mut tiles: Vec<Tile> = Vec::new();
    let mut pending = placed.into_iter().peekable();

    for (column, revision) in revisions.iter().enumerate().skip(first_column) {
        let Some((_, event)) = pending.next_if(|(c, _)| *c == column) else {
            tiles.push(Tile::new(TileKind::Empty));
            continue;
        };
        match event {
            AssetEvent::Ditto { .. } => match tiles.last_mut() {
                Some(tile) if tile.kind != TileKind::Empty => tile.span += 1,
                _ => {
                    anomaly(event, AnomalyKind::DittoWithoutTile);
                    tiles.push(Tile::new(TileKind::Broken));
                }
            },
            AssetEvent::NewOrChanged {
                revision: key,
                file_name,
                source_path,
            } => tiles.push(Tile::new(TileKind::Asset {
                thumbnail: links.thumbnail(key, file_name),
                source_url: links.source(&revision.tag, source_path, file_name),
            })),
        }
    }

    while tiles.last().is_some_and(|t| t.kind == TileKind::Empty) {
        tiles.pop();
    }

    Some(Row {
        identifier: identifier.to_string(),
        first_column,
        tiles,
    })
}

/// Rows for every identifier, in identifier order.
pub fn build_rows(collection: &Collection, config: &Config) -> (Vec<Row>, Vec<IndexAnomaly>) {
    let links = TileLinks::new(config);
    let mut anomalies = Vec::new();
    let rows = collection
        .index
        .iter()
        .filter_map(|(identifier, events)| {
            build_row(identifier, events, &collection.revisions, &links, &mut anomalies)
        })
        .collect();
    (rows, anomalies)
}

// ============================================================================
// HTML
// ============================================================================

/// The finished document plus everything that had to be patched over.
#[derive(Debug)]
pub struct Rendered {
    pub html: String,
    pub anomalies: Vec<IndexAnomaly>,
    pub rows: usize,
}

pub fn render_document(collection: &Collection, config: &Config) -> Rendered {
    let (rows, anomalies) = build_rows(collection, config);
    let report = &config.report;
    let grid = format!(
        "--column-width: {w}px; grid-template-columns: repeat({n}, {w}px);",
        n = collection.revisions.len().max(1),
        w = report.column_width
    );

    let content = html! {
        (intro(report))
        main style=(grid) {
            @for revision in &collection.revisions {
                h3 title=(revision.tag) { (revision.label) }
            }
            @for row in &rows {
                (render_row(row))
            }
        }
    };

    Rendered {
        html: base_document(&report.title, CSS_STATIC, content).into_string(),
        anomalies,
        rows: rows.len(),
    }
}

fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn intro(report: &ReportConfig) -> Markup {
    html! {
        h1 { (report.heading) }
        p {
            "All backgrounds found in "
            a href=(report.repository_url) { "the source repository" }
            ". Each column is a tagged release that added or changed at least one background."
        }
        p { "Thumbnails link to the original file at the release that introduced it." }
    }
}

fn render_row(row: &Row) -> Markup {
    let placement = format!(
        "grid-column: {} / span {};",
        row.first_column + 1,
        row.width()
    );
    html! {
        div.row style=(placement) title=(row.identifier) {
            @for tile in &row.tiles {
                (render_tile(tile, &row.identifier))
            }
        }
    }
}

fn render_tile(tile: &Tile, identifier: &str) -> Markup {
    let span = format!("grid-column: span {};", tile.span);
    html! {
        @match &tile.kind {
            TileKind::Asset { thumbnail, source_url } => {
                a.bg href=(source_url) style=(span) {
                    img loading="lazy" src=(thumbnail) alt=(identifier);
                }
            }
            TileKind::Broken => {
                div.bg.broken style=(span) title="first seen unchanged, no thumbnail" {}
            }
            TileKind::Empty => {
                div.empty style=(span) title="no background with this name for this release" {}
            }
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Render and write `index.html` under `output_root`.
pub fn write_report(
    collection: &Collection,
    config: &Config,
    output_root: &Path,
) -> Result<Rendered, RenderError> {
    let rendered = render_document(collection, config);
    fs::create_dir_all(output_root)?;
    fs::write(output_root.join(REPORT_FILE), &rendered.html)?;
    Ok(rendered)
}

/// Write `index.json` under `output_root` and return its path.
pub fn write_collection(collection: &Collection, output_root: &Path) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(output_root)?;
    let path = output_root.join(COLLECTION_FILE);
    let json = serde_json::to_string_pretty(collection)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn read_collection(path: &Path) -> Result<Collection, RenderError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn revisions(tags: &[&str]) -> Vec<Revision> {
        tags.iter()
            .map(|t| Revision::from_tag(t, &Config::default().source.tag_prefixes).unwrap())
            .collect()
    }

    fn new(revision: &str, file_name: &str) -> AssetEvent {
        AssetEvent::NewOrChanged {
            revision: revision.to_string(),
            file_name: file_name.to_string(),
            source_path: format!("backgrounds/{file_name}"),
        }
    }

    fn ditto(revision: &str) -> AssetEvent {
        AssetEvent::Ditto {
            revision: revision.to_string(),
        }
    }

    fn row(events: &[AssetEvent], axis: &[Revision]) -> (Option<Row>, Vec<IndexAnomaly>) {
        let config = Config::default();
        let links = TileLinks::new(&config);
        let mut anomalies = Vec::new();
        let row = build_row("blobs-d", events, axis, &links, &mut anomalies);
        (row, anomalies)
    }

    fn spans(row: &Row) -> Vec<(&'static str, usize)> {
        row.tiles
            .iter()
            .map(|t| {
                let kind = match t.kind {
                    TileKind::Asset { .. } => "asset",
                    TileKind::Broken => "broken",
                    TileKind::Empty => "empty",
                };
                (kind, t.span)
            })
            .collect()
    }

    // =========================================================================
    // Row layout
    // =========================================================================

    #[test]
    fn dittos_extend_the_previous_tile() {
        let axis = revisions(&["1.0", "2.0", "3.0", "4.0"]);
        let (row, anomalies) = row(
            &[new("2.0.0", "blobs.svg"), ditto("3.0.0"), ditto("4.0.0")],
            &axis,
        );
        let row = row.unwrap();

        assert_eq!(row.first_column, 1);
        assert_eq!(spans(&row), vec![("asset", 3)]);
        assert_eq!(row.width(), 3);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn first_ditto_becomes_broken_tile() {
        let axis = revisions(&["1.0", "2.0"]);
        let (row, anomalies) = row(&[ditto("1.0.0"), ditto("2.0.0")], &axis);
        let row = row.unwrap();

        assert_eq!(spans(&row), vec![("broken", 2)]);
        assert_eq!(
            anomalies,
            vec![IndexAnomaly {
                identifier: "blobs-d".to_string(),
                revision: "1.0.0".to_string(),
                kind: AnomalyKind::DittoWithoutTile,
            }]
        );
    }

    #[test]
    fn gaps_become_empty_tiles() {
        let axis = revisions(&["1.0", "2.0", "3.0", "4.0"]);
        let (row, _) = row(&[new("1.0.0", "a.jpg"), new("3.0.0", "a.jpg")], &axis);
        assert_eq!(
            spans(&row.unwrap()),
            vec![("asset", 1), ("empty", 1), ("asset", 1)]
        );
    }

    #[test]
    fn trailing_empty_tiles_are_trimmed() {
        let axis = revisions(&["1.0", "2.0", "3.0", "4.0"]);
        let (row, _) = row(&[new("1.0.0", "a.jpg"), ditto("2.0.0")], &axis);
        let row = row.unwrap();
        assert_eq!(spans(&row), vec![("asset", 2)]);
        assert_eq!(row.width(), 2);
    }

    #[test]
    fn ditto_after_gap_is_broken() {
        let axis = revisions(&["1.0", "2.0", "3.0"]);
        let (row, anomalies) = row(&[new("1.0.0", "a.jpg"), ditto("3.0.0")], &axis);
        assert_eq!(
            spans(&row.unwrap()),
            vec![("asset", 1), ("empty", 1), ("broken", 1)]
        );
        assert_eq!(anomalies.len(), 1);
    }

    #[test]
    fn events_off_the_axis_are_skipped() {
        let axis = revisions(&["1.0", "2.0"]);
        let (row, anomalies) = row(&[new("1.5.0", "a.jpg"), new("2.0.0", "a.jpg")], &axis);
        let row = row.unwrap();

        assert_eq!(row.first_column, 1);
        assert_eq!(spans(&row), vec![("asset", 1)]);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnknownRevision);
    }

    #[test]
    fn second_event_in_a_column_is_dropped() {
        let axis = revisions(&["1.0", "2.0"]);
        let (row, anomalies) = row(
            &[new("1.0.0", "a.jpg"), new("1.0.0", "a.png"), ditto("2.0.0")],
            &axis,
        );
        assert_eq!(spans(&row.unwrap()), vec![("asset", 2)]);
        assert_eq!(anomalies[0].kind, AnomalyKind::OutOfOrder);
    }

    #[test]
    fn no_events_on_axis_means_no_row() {
        let axis = revisions(&["1.0"]);
        let (row, anomalies) = row(&[new("9.0.0", "a.jpg")], &axis);
        assert!(row.is_none());
        assert_eq!(anomalies.len(), 1);
    }

    #[test]
    fn asset_tile_links() {
        let axis = revisions(&["GNOME_BACKGROUNDS_3_10"]);
        let (row, _) = row(&[new("3.10.0", "blobs.svg")], &axis);
        let row = row.unwrap();
        assert_eq!(
            row.tiles[0].kind,
            TileKind::Asset {
                thumbnail: "backgrounds/3.10.0/blobs.svg.png".to_string(),
                source_url: "https://gitlab.gnome.org/GNOME/gnome-backgrounds/-/blob/GNOME_BACKGROUNDS_3_10/backgrounds/blobs.svg?ref_type=tags".to_string(),
            }
        );
    }

    #[test]
    fn source_url_template_placeholders() {
        let mut config = Config::default();
        config.report.source_url = "https://example.org/{tag}/raw/{file}?p={path}".to_string();
        let links = TileLinks::new(&config);
        assert_eq!(
            links.source("v1", "bg/a.jpg", "a.jpg"),
            "https://example.org/v1/raw/a.jpg?p=bg/a.jpg"
        );
    }

    // =========================================================================
    // Document
    // =========================================================================

    fn sample_collection() -> Collection {
        let mut collection = Collection {
            revisions: revisions(&["GNOME_BACKGROUNDS_3_2", "GNOME_BACKGROUNDS_3_10"]),
            ..Collection::default()
        };
        collection.index.insert(
            "wood-l".to_string(),
            vec![new("3.2.0", "wood.jpg"), ditto("3.10.0")],
        );
        collection
            .index
            .insert("blobs-d".to_string(), vec![new("3.10.0", "blobs.svg")]);
        collection
    }

    #[test]
    fn document_starts_with_doctype() {
        let rendered = render_document(&sample_collection(), &Config::default());
        assert!(rendered.html.starts_with("<!DOCTYPE html>"));
        assert!(rendered.html.contains("<title>Gnome Backgrounds over Time</title>"));
    }

    #[test]
    fn header_has_one_label_per_revision() {
        let html = render_document(&sample_collection(), &Config::default()).html;
        assert_eq!(html.matches("<h3").count(), 2);
        assert!(html.contains(">3.2</h3>"));
        assert!(html.contains(">3.10</h3>"));
        assert!(html.contains("grid-template-columns: repeat(2, 120px);"));
    }

    #[test]
    fn rows_are_placed_on_the_grid() {
        let rendered = render_document(&sample_collection(), &Config::default());
        assert_eq!(rendered.rows, 2);
        assert!(rendered.html.contains(r#"style="grid-column: 1 / span 2;" title="wood-l""#));
        assert!(rendered.html.contains(r#"style="grid-column: 2 / span 1;" title="blobs-d""#));
        assert!(rendered.html.contains(r#"src="backgrounds/3.2.0/wood.jpg.png""#));
        assert!(rendered.html.contains(r#"loading="lazy""#));
    }

    #[test]
    fn anomalies_are_returned_not_fatal() {
        let mut collection = sample_collection();
        collection
            .index
            .insert("ghost".to_string(), vec![ditto("3.2.0")]);
        let rendered = render_document(&collection, &Config::default());
        assert_eq!(rendered.anomalies.len(), 1);
        assert!(rendered.html.contains("bg broken"));
    }

    #[test]
    fn text_is_escaped() {
        let mut collection = sample_collection();
        collection
            .index
            .insert("<script>".to_string(), vec![new("3.2.0", "x.jpg")]);
        let mut config = Config::default();
        config.report.heading = "Tom & Jerry".to_string();

        let html = render_document(&collection, &config).html;
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(!html.contains("title=\"<script>\""));
    }

    #[test]
    fn empty_collection_renders() {
        let rendered = render_document(&Collection::default(), &Config::default());
        assert_eq!(rendered.rows, 0);
        assert!(rendered.html.contains("repeat(1, 120px)"));
    }

    #[test]
    fn anomaly_messages() {
        let anomaly = IndexAnomaly {
            identifier: "vnc-l".to_string(),
            revision: "2.20.0".to_string(),
            kind: AnomalyKind::DittoWithoutTile,
        };
        assert_eq!(
            anomaly.to_string(),
            "vnc-l is unchanged at 2.20.0 but has no earlier thumbnail"
        );
    }

    // =========================================================================
    // Files
    // =========================================================================

    #[test]
    fn write_report_creates_index_html() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let rendered = write_report(&sample_collection(), &Config::default(), &out).unwrap();

        let written = fs::read_to_string(out.join(REPORT_FILE)).unwrap();
        assert_eq!(written, rendered.html);
    }

    #[test]
    fn collection_file_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let collection = sample_collection();
        let path = write_collection(&collection, tmp.path()).unwrap();

        assert_eq!(path, tmp.path().join(COLLECTION_FILE));
        assert_eq!(read_collection(&path).unwrap(), collection);
    }

    #[test]
    fn read_collection_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = read_collection(&tmp.path().join("nope.json"));
        assert!(matches!(result, Err(RenderError::Io(_))));
    }

    #[test]
    fn read_collection_bad_json_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(COLLECTION_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_collection(&path), Err(RenderError::Json(_))));
    }
}

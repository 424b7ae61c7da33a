//! CLI output formatting for the collect and render stages.
//!
//! # Output Format
//!
//! ## Collect
//!
//! ```text
//! Baseline GNOME_BACKGROUNDS_3_0, 3 revisions to walk (magick thumbnails)
//! 001/003 GNOME_BACKGROUNDS_3_2 (3.2.0)
//!     wood-l: wood.jpg created
//!     1 unchanged
//! 002/003 GNOME_BACKGROUNDS_3_4 (3.4.0): no asset changes
//! 003/003 GNOME_BACKGROUNDS_3_10 (3.10.0)
//!     blobs-d: blobs.svg existing
//!     Collision: backgrounds/blobs.png
//!
//! 2 of 3 revisions with changes, 1 thumbnails created, 1 existing
//! Index: dist/index.json (2 identifiers)
//! ```
//!
//! ## Render
//!
//! ```text
//! dist/index.html: 2 rows across 2 revisions
//! warning: vnc-l is unchanged at 2.20.0 but has no earlier thumbnail
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects. Anomaly warnings go to stderr.

use crate::index::Collection;
use crate::render::{IndexAnomaly, Rendered};
use crate::thumbnails::Outcome;
use crate::walk::{WalkEvent, WalkStats};
use std::path::Path;

/// Format a 1-based position as `NNN/TTT`, zero-padded to the total's width
/// but never below three digits.
fn format_position(pos: usize, total: usize) -> String {
    let width = total.to_string().len().max(3);
    format!("{:0>width$}/{:0>width$}", pos, total, width = width)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Collect output
// ============================================================================

/// Format a single walk progress event as display lines.
pub fn format_walk_event(event: &WalkEvent) -> Vec<String> {
    match event {
        WalkEvent::Started {
            baseline,
            transitions,
            backend,
        } => vec![format!(
            "Baseline {}, {} revisions to walk ({} thumbnails)",
            baseline, transitions, backend
        )],
        WalkEvent::RevisionProcessed {
            index,
            total,
            tag,
            version,
            included,
            thumbnails,
            dittos,
            collisions,
        } => {
            let header = format!("{} {} ({})", format_position(*index, *total), tag, version);
            if !included {
                return vec![format!("{}: no asset changes", header)];
            }
            let mut lines = vec![header];
            for thumb in thumbnails {
                let status = match thumb.outcome {
                    Outcome::Created => "created",
                    Outcome::Skipped => "existing",
                };
                lines.push(format!(
                    "{}{}: {} {}",
                    indent(1),
                    thumb.identifier,
                    thumb.file_name,
                    status
                ));
            }
            if *dittos > 0 {
                lines.push(format!("{}{} unchanged", indent(1), dittos));
            }
            for path in collisions {
                lines.push(format!("{}Collision: {}", indent(1), path));
            }
            lines
        }
    }
}

/// Summary after a walk, including where the index was written.
pub fn format_collect_summary(
    stats: &WalkStats,
    collection: &Collection,
    index_path: &Path,
) -> Vec<String> {
    vec![
        String::new(),
        stats.to_string(),
        format!(
            "Index: {} ({} identifiers)",
            index_path.display(),
            collection.index.len()
        ),
    ]
}

pub fn print_collect_summary(stats: &WalkStats, collection: &Collection, index_path: &Path) {
    for line in format_collect_summary(stats, collection, index_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Render output
// ============================================================================

pub fn format_render_output(
    rendered: &Rendered,
    collection: &Collection,
    report_path: &Path,
) -> Vec<String> {
    vec![format!(
        "{}: {} rows across {} revisions",
        report_path.display(),
        rendered.rows,
        collection.revisions.len()
    )]
}

pub fn format_anomalies(anomalies: &[IndexAnomaly]) -> Vec<String> {
    anomalies
        .iter()
        .map(|a| format!("warning: {}", a))
        .collect()
}

/// Print the render summary to stdout and anomalies to stderr.
pub fn print_render_output(rendered: &Rendered, collection: &Collection, report_path: &Path) {
    for line in format_render_output(rendered, collection, report_path) {
        println!("{}", line);
    }
    for line in format_anomalies(&rendered.anomalies) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

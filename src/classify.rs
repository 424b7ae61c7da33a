//! Map asset file names to logical identifiers ("shortnames").
//!
//! An identifier is one row of the report. Naming conventions in the
//! background repository changed over the years (light/dark variants gained
//! `-l`/`-d` suffixes, some files were renamed), so a handful of historical
//! stems are aliased onto their modern identifier to keep pre- and post-rename
//! files in the same row.
//!
//! Case policy: identifiers keep the case of the file name. `Sandstone.jpg`
//! and `sandstone.jpg` are different rows.

use std::collections::BTreeMap;

/// Historical stem → modern identifier.
const STOCK_ALIASES: &[(&str, &str)] = &[
    ("brushstrokes", "brush-strokes-l"),
    ("blobs", "blobs-d"),
    ("disco", "disco-l"),
    ("vnc", "vnc-l"),
    ("wood", "wood-l"),
];

/// Pure file-name → identifier mapping with a fixed alias table.
#[derive(Debug, Clone)]
pub struct Classifier {
    aliases: BTreeMap<String, String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl Classifier {
    /// Stock aliases, extended and overridden by `extra`.
    pub fn new(extra: &BTreeMap<String, String>) -> Self {
        let mut aliases: BTreeMap<String, String> = STOCK_ALIASES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        aliases.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { aliases }
    }

    /// Identifier for a file name like `blobs.svg`.
    pub fn classify(&self, file_name: &str) -> String {
        let stem = strip_extension(file_name);
        match self.aliases.get(stem) {
            Some(alias) => alias.clone(),
            None => stem.to_string(),
        }
    }
}

/// Drop everything from the last `.` on.
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

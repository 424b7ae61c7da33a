//! Tag parsing into sortable version keys.
//!
//! Tag names in the background repository are inconsistent: two different
//! prefixes (one of them misspelled), underscores or dots as separators,
//! alphabetic suffixes, and the occasional four-segment number. They still
//! have to sort in release order, so every tag is normalized into a
//! `major.minor.patch[-pre]` string first:
//!
//! ```text
//! GNOME_BACKGROUNDS_2_28_0   → 2.28.0
//! GNOME_BACKRGROUNDS_2_9_4_1 → 2.9.41        (fourth segment folded into patch)
//! 3.1                        → 3.1.0
//! 2_91_90beta                → 2.91.0-90beta (sorts before 2.91.0)
//! ```
//!
//! The normalized string is then parsed into a [`VersionKey`] that orders like
//! a semantic version.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Malformed tag {tag:?}: {reason}")]
    MalformedTag { tag: String, reason: String },
}

impl VersionError {
    fn malformed(tag: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTag {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

/// One dot-separated pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PreIdent {
    Numeric(u64),
    Alpha(String),
}

impl Ord for PreIdent {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PreIdent::Numeric(a), PreIdent::Numeric(b)) => a.cmp(b),
            (PreIdent::Numeric(_), PreIdent::Alpha(_)) => Ordering::Less,
            (PreIdent::Alpha(_), PreIdent::Numeric(_)) => Ordering::Greater,
            (PreIdent::Alpha(a), PreIdent::Alpha(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for PreIdent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PreIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreIdent::Numeric(n) => write!(f, "{n}"),
            PreIdent::Alpha(s) => f.write_str(s),
        }
    }
}

/// A totally-ordered release key: `major.minor.patch[-pre]`.
///
/// A key with a pre-release sorts before the same triple without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionKey {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pre: Vec<PreIdent>,
}

impl VersionKey {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, ident) in self.pre.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            write!(f, "{ident}")?;
        }
        Ok(())
    }
}

impl FromStr for VersionKey {
    type Err = VersionError;

    /// Parse a normalized `major.minor.patch[-pre]` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (s, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::malformed(
                s,
                format!("expected 3 core components, found {}", parts.len()),
            ));
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = parse_numeric(part)
                .ok_or_else(|| VersionError::malformed(s, format!("{part:?} is not numeric")))?;
        }

        let pre = match pre {
            Some(pre) => pre
                .split('.')
                .map(|ident| {
                    if ident.is_empty() {
                        Err(VersionError::malformed(s, "empty pre-release identifier"))
                    } else if let Some(n) = parse_numeric(ident) {
                        Ok(PreIdent::Numeric(n))
                    } else {
                        Ok(PreIdent::Alpha(ident.to_string()))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }
}

impl TryFrom<String> for VersionKey {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionKey> for String {
    fn from(key: VersionKey) -> Self {
        key.to_string()
    }
}

fn parse_numeric(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Strip every known prefix and turn underscores into dots.
///
/// This is also the column label shown in the report.
pub fn clean_tag(raw: &str, prefixes: &[String]) -> String {
    let mut cleaned = raw.to_string();
    for prefix in prefixes {
        cleaned = cleaned.replace(prefix.as_str(), "");
    }
    cleaned.replace('_', ".")
}

/// Normalize a raw tag into a dotted `major.minor.patch[-pre]` string.
pub fn normalize_tag(raw: &str, prefixes: &[String]) -> String {
    let cleaned = clean_tag(raw, prefixes);
    let mut tokens: Vec<String> = cleaned.split('.').map(str::to_string).collect();

    let has_letter = tokens
        .last()
        .is_some_and(|last| last.chars().any(char::is_alphabetic));
    if has_letter {
        let suffix = format!("0-{}", tokens.pop().unwrap_or_default());
        while tokens.len() < 2 {
            tokens.push("0".to_string());
        }
        tokens.push(suffix);
    } else {
        while tokens.len() < 3 {
            tokens.push("0".to_string());
        }
    }

    if tokens.len() > 3 {
        let folded: String = tokens.drain(2..).collect();
        tokens.push(folded);
    }

    tokens.join(".")
}

/// Parse a raw tag into its [`VersionKey`].
pub fn parse_tag(raw: &str, prefixes: &[String]) -> Result<VersionKey, VersionError> {
    normalize_tag(raw, prefixes)
        .parse()
        .map_err(|e: VersionError| match e {
            VersionError::MalformedTag { reason, .. } => VersionError::malformed(raw, reason),
        })
}

/// A tagged snapshot of the asset repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Raw tag as listed by git.
    pub tag: String,
    /// Cleaned tag text used as the column header.
    pub label: String,
    /// Sort key. Its display form names the revision's output directory.
    pub version: VersionKey,
}

impl Revision {
    pub fn from_tag(tag: &str, prefixes: &[String]) -> Result<Self, VersionError> {
        Ok(Self {
            tag: tag.to_string(),
            label: clean_tag(tag, prefixes),
            version: parse_tag(tag, prefixes)?,
        })
    }

    /// Normalized version string, e.g. `2.28.0`.
    pub fn key(&self) -> String {
        self.version.to_string()
    }
}

/// Sort revisions ascending by version. Equal keys fall back to the raw tag.
pub fn sort_revisions(revisions: &mut [Revision]) {
    revisions.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.tag.cmp(&b.tag)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec![
            "GNOME_BACKRGROUNDS_".to_string(),
            "GNOME_BACKGROUNDS_".to_string(),
        ]
    }

    fn key(tag: &str) -> VersionKey {
        parse_tag(tag, &prefixes()).unwrap()
    }

    #[test]
    fn gnome_prefix_is_stripped() {
        assert_eq!(key("GNOME_BACKGROUNDS_2_28_0"), VersionKey::new(2, 28, 0));
        assert_eq!(key("GNOME_BACKGROUNDS_2_28_0").to_string(), "2.28.0");
    }

    #[test]
    fn misspelled_prefix_is_stripped() {
        assert_eq!(key("GNOME_BACKRGROUNDS_2_9_90"), VersionKey::new(2, 9, 90));
    }

    #[test]
    fn short_tags_are_padded() {
        assert_eq!(key("42"), VersionKey::new(42, 0, 0));
        assert_eq!(key("3.1"), VersionKey::new(3, 1, 0));
        assert_eq!(key("44.0"), VersionKey::new(44, 0, 0));
    }

    #[test]
    fn four_segments_fold_into_patch() {
        assert_eq!(normalize_tag("2.9.4.1", &prefixes()), "2.9.41");
        assert_eq!(key("GNOME_BACKGROUNDS_2_14_2_1"), VersionKey::new(2, 14, 21));
    }

    #[test]
    fn five_segments_fold_into_patch() {
        assert_eq!(normalize_tag("1.2.3.4.5", &prefixes()), "1.2.345");
    }

    #[test]
    fn alphabetic_suffix_becomes_prerelease() {
        assert_eq!(normalize_tag("2_91_90beta", &prefixes()), "2.91.0-90beta");
        let k = key("2_91_90beta");
        assert!(k.is_prerelease());
        assert_eq!(k.to_string(), "2.91.0-90beta");
    }

    #[test]
    fn prerelease_sorts_before_release() {
        assert!(key("2_91_90beta") < key("2.91.0"));
        assert!(key("2_91_90beta") < key("2.91.1"));
        assert!(key("2_91_90beta") > key("2.90.5"));
    }

    #[test]
    fn single_alpha_token_padded_to_two_core() {
        assert_eq!(normalize_tag("40.beta", &prefixes()), "40.0.0-beta");
        assert_eq!(normalize_tag("40.rc", &prefixes()), "40.0.0-rc");
        assert!(key("40.beta") < key("40.rc"));
        assert!(key("40.rc") < key("40.0"));
    }

    #[test]
    fn alpha_suffix_after_three_numbers_folds() {
        assert_eq!(normalize_tag("3.1.2.beta", &prefixes()), "3.1.20-beta");
        assert_eq!(key("3.1.2.beta").to_string(), "3.1.20-beta");
    }

    #[test]
    fn non_numeric_core_is_malformed() {
        let err = parse_tag("release-candidate.x.1", &prefixes()).unwrap_err();
        assert!(matches!(
            &err,
            VersionError::MalformedTag { tag, .. } if tag == "release-candidate.x.1"
        ));
    }

    #[test]
    fn uppercase_suffix_counts_as_letter() {
        assert!(key("3.0.RC") < key("3.0.0"));
    }

    #[test]
    fn empty_tag_is_malformed() {
        assert!(parse_tag("", &prefixes()).is_err());
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert!(key("2.9.0") < key("2.10.0"));
        assert!(key("3.9") < key("3.10"));
        assert!(key("3.38.0") < key("40.0"));
    }

    #[test]
    fn parse_is_deterministic() {
        for tag in ["GNOME_BACKGROUNDS_2_28_0", "2_91_90beta", "2.9.4.1", "45.rc"] {
            assert_eq!(key(tag), key(tag));
            // Re-parsing the normalized form yields the same key
            let k = key(tag);
            assert_eq!(k.to_string().parse::<VersionKey>().unwrap(), k);
        }
    }

    #[test]
    fn release_history_is_ordered() {
        let chronological = [
            "GNOME_BACKGROUNDS_2_8_0",
            "GNOME_BACKRGROUNDS_2_9_4_1",
            "GNOME_BACKGROUNDS_2_9_90",
            "GNOME_BACKGROUNDS_2_10_0",
            "GNOME_BACKGROUNDS_2_28_0",
            "2_91_90beta",
            "2.91.0",
            "3.0.0",
            "3.38.0",
            "40.beta",
            "40.0",
            "42.0",
            "47.0",
        ];
        for pair in chronological.windows(2) {
            assert!(key(pair[0]) < key(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn prerelease_identifiers_follow_semver() {
        let a: VersionKey = "1.0.0-alpha".parse().unwrap();
        let b: VersionKey = "1.0.0-alpha.1".parse().unwrap();
        let c: VersionKey = "1.0.0-alpha.beta".parse().unwrap();
        let d: VersionKey = "1.0.0-beta.2".parse().unwrap();
        let e: VersionKey = "1.0.0-beta.11".parse().unwrap();
        let f: VersionKey = "1.0.0".parse().unwrap();
        assert!(a < b && b < c && c < d && d < e && e < f);
    }

    #[test]
    fn key_serializes_as_string() {
        let k = key("2_91_90beta");
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"2.91.0-90beta\"");
        let back: VersionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, k);
    }

    #[test]
    fn revision_label_is_cleaned_tag() {
        let rev = Revision::from_tag("GNOME_BACKGROUNDS_2_14_2_1", &prefixes()).unwrap();
        assert_eq!(rev.label, "2.14.2.1");
        assert_eq!(rev.key(), "2.14.21");
    }

    #[test]
    fn sort_revisions_orders_by_version() {
        let mut revs: Vec<Revision> = ["45.0", "GNOME_BACKGROUNDS_2_28_0", "3.0.0", "45.beta"]
            .iter()
            .map(|t| Revision::from_tag(t, &prefixes()).unwrap())
            .collect();
        sort_revisions(&mut revs);
        let tags: Vec<&str> = revs.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["GNOME_BACKGROUNDS_2_28_0", "3.0.0", "45.beta", "45.0"]);
    }

    #[test]
    fn equal_keys_tie_break_on_tag() {
        let mut revs: Vec<Revision> = ["GNOME_BACKGROUNDS_2_28_0", "2.28.0"]
            .iter()
            .map(|t| Revision::from_tag(t, &prefixes()).unwrap())
            .collect();
        sort_revisions(&mut revs);
        assert_eq!(revs[0].tag, "2.28.0");
    }
}

//! Value and record types shared by the engine, the filter and the renderers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed document node. Built with `preserve_order`, so object keys keep
/// the order in which the parser saw them.
pub type DocumentValue = serde_json::Value;

/// What happened at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Added => "added",
            DiffKind::Removed => "removed",
            DiffKind::Modified => "modified",
            DiffKind::Unchanged => "unchanged",
        }
    }

    /// Single-character marker used by the tree renderer.
    pub fn symbol(&self) -> char {
        match self {
            DiffKind::Added => '+',
            DiffKind::Removed => '-',
            DiffKind::Modified => '~',
            DiffKind::Unchanged => '=',
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed difference, scoped to a single path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRecord {
    /// Dotted/bracketed address, e.g. `user.items[2].name`. Empty for the root.
    pub path: String,
    pub kind: DiffKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<DocumentValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<DocumentValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Index of the compared document in a multi-document run (baseline is 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_index: Option<usize>,
}

impl DiffRecord {
    pub fn added(path: impl Into<String>, value: DocumentValue) -> Self {
        Self {
            path: path.into(),
            kind: DiffKind::Added,
            old_value: None,
            new_value: Some(value),
            note: None,
            file_index: None,
        }
    }

    pub fn removed(path: impl Into<String>, value: DocumentValue) -> Self {
        Self {
            path: path.into(),
            kind: DiffKind::Removed,
            old_value: Some(value),
            new_value: None,
            note: None,
            file_index: None,
        }
    }

    pub fn modified(path: impl Into<String>, old: DocumentValue, new: DocumentValue) -> Self {
        Self {
            path: path.into(),
            kind: DiffKind::Modified,
            old_value: Some(old),
            new_value: Some(new),
            note: None,
            file_index: None,
        }
    }

    pub fn unchanged(path: impl Into<String>, old: DocumentValue, new: DocumentValue) -> Self {
        Self {
            path: path.into(),
            kind: DiffKind::Unchanged,
            old_value: Some(old),
            new_value: Some(new),
            note: None,
            file_index: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Comparison options. Immutable for the duration of a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompareConfig {
    /// Compare arrays as multisets instead of index by index.
    pub ignore_array_order: bool,
    /// Number of container levels the engine will open.
    pub max_depth: usize,
    pub case_sensitive: bool,
    /// Trim leading/trailing whitespace before comparing strings.
    pub ignore_whitespace: bool,
    /// Emit `Unchanged` records for equal leaves and matched array elements.
    pub include_unchanged: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            ignore_array_order: false,
            max_depth: 100,
            case_sensitive: true,
            ignore_whitespace: false,
            include_unchanged: false,
        }
    }
}

impl CompareConfig {
    pub fn with_ignore_array_order(mut self, on: bool) -> Self {
        self.ignore_array_order = on;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    pub fn with_ignore_whitespace(mut self, on: bool) -> Self {
        self.ignore_whitespace = on;
        self
    }

    pub fn with_include_unchanged(mut self, on: bool) -> Self {
        self.include_unchanged = on;
        self
    }
}

/// Per-kind counts over a record list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    #[serde(skip_serializing)]
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn from_records(records: &[DiffRecord]) -> Self {
        let mut stats = DiffStats {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match record.kind {
                DiffKind::Added => stats.added += 1,
                DiffKind::Removed => stats.removed += 1,
                DiffKind::Modified => stats.modified += 1,
                DiffKind::Unchanged => stats.unchanged += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_camel_case_and_skips_absent_values() {
        let record = DiffRecord::added("user.age", json!(31));
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(
            encoded,
            json!({ "path": "user.age", "kind": "added", "newValue": 31 })
        );
    }

    #[test]
    fn stats_count_every_kind() {
        let records = vec![
            DiffRecord::added("a", json!(1)),
            DiffRecord::removed("b", json!(2)),
            DiffRecord::modified("c", json!(1), json!(2)),
            DiffRecord::modified("d", json!("x"), json!("y")),
            DiffRecord::unchanged("e", json!(true), json!(true)),
        ];
        let stats = DiffStats::from_records(&records);
        assert_eq!(
            stats,
            DiffStats {
                total: 5,
                added: 1,
                removed: 1,
                modified: 2,
                unchanged: 1,
            }
        );
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = CompareConfig::default();
        assert!(!config.ignore_array_order);
        assert_eq!(config.max_depth, 100);
        assert!(config.case_sensitive);
        assert!(!config.ignore_whitespace);
        assert!(!config.include_unchanged);
    }
}

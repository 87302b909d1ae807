use regex::Regex;

use crate::types::{DiffKind, DiffRecord};

/// Post-filter criteria. Unset criteria accept everything.
#[derive(Clone, Debug, Default)]
pub struct ResultFilter {
    pub kinds: Option<Vec<DiffKind>>,
    /// Searched anywhere in the path, not anchored.
    pub path_pattern: Option<Regex>,
    /// Maximum number of `.` separators in the path.
    pub max_depth: Option<usize>,
}

impl ResultFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = DiffKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn path_pattern(mut self, pattern: Regex) -> Self {
        self.path_pattern = Some(pattern);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn matches(&self, record: &DiffRecord) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&record.kind) {
                return false;
            }
        }
        if let Some(pattern) = &self.path_pattern {
            if !pattern.is_match(&record.path) {
                return false;
            }
        }
        if let Some(max_depth) = self.max_depth {
            if path_depth(&record.path) > max_depth {
                return false;
            }
        }
        true
    }
}

/// Dot-separated depth of a record path; array indices do not count.
pub fn path_depth(path: &str) -> usize {
    path.matches('.').count()
}

/// Keep the records accepted by `filter`, in their original order.
pub fn filter_results(records: &[DiffRecord], filter: &ResultFilter) -> Vec<DiffRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::error::{DiffError, DiffResult};
use crate::types::{CompareConfig, DiffRecord, DocumentValue};

/// Depth at which the root pair is compared.
pub const ROOT_DEPTH: usize = 1;

pub const DEPTH_EXCEEDED_NOTE: &str = "maximum depth exceeded";

/// Compare `documents` under `config`. See [`Comparator::compare`].
pub fn compare(documents: &[DocumentValue], config: &CompareConfig) -> DiffResult<Vec<DiffRecord>> {
    Comparator::new(config.clone()).compare(documents)
}

/// Recursive, path-addressed document comparison.
///
/// Holds only the configuration; every call works on borrowed inputs and
/// returns freshly allocated records, so one comparator can be shared freely.
#[derive(Clone, Debug, Default)]
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two or more documents.
    ///
    /// With exactly two, the result is a single comparison rooted at `""`.
    /// With more, the first document is the baseline and every other document
    /// is compared against it in turn; each record is tagged with the index of
    /// the document it came from and its note names the pair.
    pub fn compare(&self, documents: &[DocumentValue]) -> DiffResult<Vec<DiffRecord>> {
        if documents.len() < 2 {
            return Err(DiffError::InvalidArgument(format!(
                "at least two documents are required for comparison, got {}",
                documents.len()
            )));
        }

        if let [left, right] = documents {
            let records = self.deep_compare(left, right, "", ROOT_DEPTH);
            debug!(records = records.len(), "compared two documents");
            return Ok(records);
        }

        let baseline = &documents[0];
        let mut records = Vec::new();
        for (index, document) in documents.iter().enumerate().skip(1) {
            let pair = format!("comparison between file 0 and file {index}");
            let pair_records = self.deep_compare(baseline, document, "", ROOT_DEPTH);
            debug!(file = index, records = pair_records.len(), "compared against baseline");

            records.extend(pair_records.into_iter().map(|mut record| {
                record.note = Some(match record.note.take() {
                    Some(note) => format!("{note} ({pair})"),
                    None => pair.clone(),
                });
                record.file_index = Some(index);
                record
            }));
        }
        Ok(records)
    }

    /// Compare two values found at `path`, `depth` levels below the top.
    pub fn deep_compare(
        &self,
        left: &DocumentValue,
        right: &DocumentValue,
        path: &str,
        depth: usize,
    ) -> Vec<DiffRecord> {
        let mut records = Vec::new();
        self.compare_values(&mut records, left, right, path, depth);
        records
    }

    fn compare_values(
        &self,
        out: &mut Vec<DiffRecord>,
        left: &Value,
        right: &Value,
        path: &str,
        depth: usize,
    ) {
        if depth > self.config.max_depth {
            if left == right {
                self.push_unchanged(out, path, left, right);
            } else {
                trace!(path, depth, "depth limit reached");
                out.push(
                    DiffRecord::modified(path, left.clone(), right.clone())
                        .with_note(DEPTH_EXCEEDED_NOTE),
                );
            }
            return;
        }

        match (left, right) {
            (Value::Null, Value::Null) => self.push_unchanged(out, path, left, right),
            (Value::Null, _) | (_, Value::Null) => {
                out.push(DiffRecord::modified(path, left.clone(), right.clone()));
            }
            (Value::Object(l), Value::Object(r)) => self.compare_objects(out, l, r, path, depth + 1),
            (Value::Array(l), Value::Array(r)) => {
                if self.config.ignore_array_order {
                    self.compare_arrays_unordered(out, l, r, path);
                } else {
                    self.compare_arrays_by_index(out, l, r, path, depth + 1);
                }
            }
            (Value::String(l), Value::String(r)) => {
                if self.normalize(l) == self.normalize(r) {
                    self.push_unchanged(out, path, left, right);
                } else {
                    out.push(DiffRecord::modified(path, left.clone(), right.clone()));
                }
            }
            (Value::Bool(l), Value::Bool(r)) => self.push_leaf(out, path, left, right, l == r),
            (Value::Number(l), Value::Number(r)) => {
                self.push_leaf(out, path, left, right, numbers_equal(l, r));
            }
            _ => {
                let note = format!(
                    "type changed from {} to {}",
                    type_name(left),
                    type_name(right)
                );
                out.push(DiffRecord::modified(path, left.clone(), right.clone()).with_note(note));
            }
        }
    }

    // Keys are visited left-first, then right-only keys in right order.
    fn compare_objects(
        &self,
        out: &mut Vec<DiffRecord>,
        left: &Map<String, Value>,
        right: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) {
        for (key, left_value) in left {
            let child = key_path(path, key);
            match right.get(key) {
                Some(right_value) => self.compare_values(out, left_value, right_value, &child, depth),
                None => out.push(DiffRecord::removed(child, left_value.clone())),
            }
        }

        for (key, right_value) in right {
            if !left.contains_key(key) {
                out.push(DiffRecord::added(key_path(path, key), right_value.clone()));
            }
        }
    }

    fn compare_arrays_by_index(
        &self,
        out: &mut Vec<DiffRecord>,
        left: &[Value],
        right: &[Value],
        path: &str,
        depth: usize,
    ) {
        let common = left.len().min(right.len());
        for (index, (l, r)) in left.iter().zip(right).enumerate() {
            self.compare_values(out, l, r, &index_path(path, index), depth);
        }
        // At most one side has a tail.
        for (index, l) in left.iter().enumerate().skip(common) {
            out.push(DiffRecord::removed(index_path(path, index), l.clone()));
        }
        for (index, r) in right.iter().enumerate().skip(common) {
            out.push(DiffRecord::added(index_path(path, index), r.clone()));
        }
    }

    /// Multiset comparison: each element is matched at most once against an
    /// element with the same canonical form on the other side. Paths use each
    /// element's index in its own array.
    fn compare_arrays_unordered(
        &self,
        out: &mut Vec<DiffRecord>,
        left: &[Value],
        right: &[Value],
        path: &str,
    ) {
        let left_keys: Vec<String> = left.iter().map(canonical_string).collect();
        let right_keys: Vec<String> = right.iter().map(canonical_string).collect();

        let mut available = index_buckets(&right_keys);
        for (index, key) in left_keys.iter().enumerate() {
            match available.get_mut(key.as_str()).and_then(VecDeque::pop_front) {
                Some(matched) => {
                    self.push_unchanged(out, &index_path(path, index), &left[index], &right[matched]);
                }
                None => out.push(DiffRecord::removed(index_path(path, index), left[index].clone())),
            }
        }

        let mut available = index_buckets(&left_keys);
        for (index, key) in right_keys.iter().enumerate() {
            if available.get_mut(key.as_str()).and_then(VecDeque::pop_front).is_none() {
                out.push(DiffRecord::added(index_path(path, index), right[index].clone()));
            }
        }
    }

    fn normalize<'a>(&self, s: &'a str) -> Cow<'a, str> {
        let s = if self.config.ignore_whitespace { s.trim() } else { s };
        if self.config.case_sensitive {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.to_lowercase())
        }
    }

    fn push_leaf(&self, out: &mut Vec<DiffRecord>, path: &str, left: &Value, right: &Value, equal: bool) {
        if equal {
            self.push_unchanged(out, path, left, right);
        } else {
            out.push(DiffRecord::modified(path, left.clone(), right.clone()));
        }
    }

    fn push_unchanged(&self, out: &mut Vec<DiffRecord>, path: &str, left: &Value, right: &Value) {
        if self.config.include_unchanged {
            out.push(DiffRecord::unchanged(path, left.clone(), right.clone()));
        }
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

fn index_buckets(keys: &[String]) -> HashMap<&str, VecDeque<usize>> {
    let mut buckets: HashMap<&str, VecDeque<usize>> = HashMap::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        buckets.entry(key.as_str()).or_default().push_back(index);
    }
    buckets
}

// 1 and 1.0 are the same number in a document.
fn numbers_equal(left: &Number, right: &Number) -> bool {
    if left.is_f64() || right.is_f64() {
        left.as_f64() == right.as_f64()
    } else {
        left == right
    }
}

/// Name of a value's runtime kind, as used in type-change notes.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact serialization with object keys sorted, so objects holding the same
/// pairs in a different order serialize identically.
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(out, child);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, child);
            }
            out.push(']');
        }
        Value::Number(n) => write_number(out, n),
        scalar => out.push_str(&scalar.to_string()),
    }
}

// Integral floats are written in integer form so that `1.0` and `1` share a
// canonical string, matching `numbers_equal`.
fn write_number(out: &mut String, n: &Number) {
    if let Some(f) = n.as_f64().filter(|f| n.is_f64() && f.fract() == 0.0) {
        // `i64::MAX as f64` and `u64::MAX as f64` round up to 2^63 and 2^64.
        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
            out.push_str(&(f as i64).to_string());
            return;
        }
        if f >= 0.0 && f < u64::MAX as f64 {
            out.push_str(&(f as u64).to_string());
            return;
        }
    }
    out.push_str(&n.to_string());
}

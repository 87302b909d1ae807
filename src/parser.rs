use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number};
use tracing::debug;

use crate::error::ParseError;
use crate::types::DocumentValue;
use crate::utils::decode_text;

const SUPPORTED_EXTENSIONS: [&str; 3] = [".json", ".jsonc", ".json5"];

/// Source dialect, chosen from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Jsonc,
    Json5,
}

impl SourceFormat {
    /// Unknown or missing extensions are treated as plain JSON.
    pub fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "jsonc" => SourceFormat::Jsonc,
            "json5" => SourceFormat::Json5,
            _ => SourceFormat::Json,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Json => "JSON",
            SourceFormat::Jsonc => "JSONC",
            SourceFormat::Json5 => "JSON5",
        })
    }
}

/// A document loaded from disk.
#[derive(Clone, Debug)]
pub struct ParsedDocument {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub content: DocumentValue,
}

pub fn supported_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

pub fn is_supported_format(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Parse text in any of the supported dialects.
///
/// Strict JSON goes through `serde_json` first, which keeps integers beyond
/// `i64` (as `u64`, or as `f64` past that). Anything it rejects is retried as
/// JSON5, a superset of the other two, so comments and trailing commas are
/// accepted everywhere. JSON5 `NaN` and `Infinity` have no document
/// representation and are rejected.
pub fn parse_str(text: &str) -> Result<DocumentValue, json5::Error> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    json5::from_str::<FiniteValue>(text).map(|v| v.0)
}

/// A document value built straight from the JSON5 deserializer, refusing
/// non-finite numbers instead of letting them collapse into `null`.
struct FiniteValue(DocumentValue);

impl<'de> Deserialize<'de> for FiniteValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FiniteValueVisitor).map(FiniteValue)
    }
}

struct FiniteValueVisitor;

impl<'de> Visitor<'de> for FiniteValueVisitor {
    type Value = DocumentValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON5 value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<DocumentValue, E> {
        Ok(DocumentValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DocumentValue, E> {
        Ok(DocumentValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DocumentValue, E> {
        Ok(DocumentValue::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DocumentValue, E> {
        Number::from_f64(v)
            .map(DocumentValue::Number)
            .ok_or_else(|| E::custom(format!("unsupported non-finite number {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DocumentValue, E> {
        Ok(DocumentValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<DocumentValue, E> {
        Ok(DocumentValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<DocumentValue, E> {
        Ok(DocumentValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<DocumentValue, E> {
        Ok(DocumentValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<DocumentValue, D::Error> {
        FiniteValue::deserialize(deserializer).map(|v| v.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<DocumentValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(FiniteValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(DocumentValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DocumentValue, A::Error> {
        let mut entries = Map::new();
        while let Some((key, FiniteValue(value))) = map.next_entry::<String, FiniteValue>()? {
            entries.insert(key, value);
        }
        Ok(DocumentValue::Object(entries))
    }
}

/// Load one file; the root must be an object.
pub fn parse_file(path: &Path) -> Result<ParsedDocument, ParseError> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ParseError::NotFound(path.to_path_buf()),
        _ => ParseError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if !metadata.is_file() {
        return Err(ParseError::NotAFile(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = SourceFormat::detect(path);
    let content = parse_str(&decode_text(bytes)).map_err(|err| ParseError::Syntax {
        format,
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    if !content.is_object() {
        return Err(ParseError::RootNotObject(path.to_path_buf()));
    }

    debug!(path = %path.display(), %format, "parsed document");
    Ok(ParsedDocument {
        path: path.to_path_buf(),
        format,
        content,
    })
}

/// Load every file in order, stopping at the first failure.
pub fn parse_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ParsedDocument>, ParseError> {
    paths.iter().map(|p| parse_file(p.as_ref())).collect()
}

// trajectory-service-rs/src/detect.rs
// Format detection: classify a data-source path into a known format tag
// A read-only probe; failure to classify is "skip this source", never fatal

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::error::LoadError;

/// Tags for the closed set of supported trajectory formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// Directory-based columnar dataset container (HuggingFace save_to_disk layout)
    HuggingFace,
    /// Single JSON document of REBEL step-log records
    RebelJson,
}

impl FormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::HuggingFace => "huggingface",
            FormatTag::RebelJson => "rebel_json",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "huggingface" => Ok(FormatTag::HuggingFace),
            "rebel_json" => Ok(FormatTag::RebelJson),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Classify a path into a known format tag, or `None` if unrecognized.
///
/// - A directory holding both `dataset_info.json` and `state.json` is the
///   columnar dataset format.
/// - A `.json` file whose top-level value is a non-empty array whose first
///   element is an object with keys `task`, `done` and `data` is the REBEL
///   step-log format. This requires loading the full document, which is
///   accepted as the format-inference cost.
///
/// Read or parse errors during probing degrade to `None`.
pub fn detect_format(path: &Path) -> Option<FormatTag> {
    if path.is_dir() {
        if path.join("dataset_info.json").is_file() && path.join("state.json").is_file() {
            return Some(FormatTag::HuggingFace);
        }
    } else if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
        match probe_rebel_json(path) {
            Ok(true) => return Some(FormatTag::RebelJson),
            Ok(false) => {}
            Err(e) => {
                tracing::debug!("format probe failed for {}: {}", path.display(), e);
            }
        }
    }
    None
}

fn probe_rebel_json(path: &Path) -> Result<bool, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::json(path, e))?;

    let first = match value.as_array().and_then(|items| items.first()) {
        Some(first) => first,
        None => return Ok(false),
    };
    let record = match first.as_object() {
        Some(record) => record,
        None => return Ok(false),
    };

    Ok(record.contains_key("task") && record.contains_key("done") && record.contains_key("data"))
}

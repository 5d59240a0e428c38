// trajectory-service-rs/src/adapters/mod.rs
// Format adapters: translate one raw record shape into the normalized
// Trajectory model. One adapter per supported format, dispatched by tag.

mod huggingface;
mod rebel;

pub use huggingface::HuggingFaceAdapter;
pub use rebel::RebelJsonAdapter;

use std::path::Path;

use serde_json::{Map, Value};

use crate::detect::FormatTag;
use crate::error::{LoadError, LoadResult};
use crate::model::Trajectory;

/// A raw record as produced by a data source, before normalization.
pub type RawRecord = Map<String, Value>;

/// Common adapter contract: format-specific deserialization plus a pure
/// per-record parse. `parse` must degrade gracefully on missing optional
/// fields; it returns an error only when the record shape is unusable.
pub trait TrajectoryAdapter: Send + Sync {
    /// The format this adapter handles.
    fn format(&self) -> FormatTag;

    /// Load all raw records from a source path.
    fn load(&self, path: &Path) -> LoadResult<Vec<RawRecord>>;

    /// Convert one raw record (plus its positional index) into a Trajectory.
    fn parse(&self, raw: &RawRecord, idx: usize) -> LoadResult<Trajectory>;

    /// Load a source and parse every record. A parse failure on one record is
    /// logged and skipped; the rest of the batch still loads. One bad record
    /// must never abort the whole source.
    fn load_and_parse(&self, path: &Path) -> LoadResult<Vec<Trajectory>> {
        let raw_records = self.load(path)?;
        let mut trajectories = Vec::with_capacity(raw_records.len());
        for (idx, record) in raw_records.iter().enumerate() {
            match self.parse(record, idx) {
                Ok(trajectory) => trajectories.push(trajectory),
                Err(e) => {
                    tracing::warn!(
                        "failed to parse trajectory {} in {}: {}",
                        idx,
                        path.display(),
                        e
                    );
                }
            }
        }
        Ok(trajectories)
    }
}

/// Select the adapter for a format tag. The format set is small and fixed by
/// the domain, so dispatch is closed rather than open-ended registration.
pub fn adapter_for(tag: FormatTag) -> Box<dyn TrajectoryAdapter> {
    match tag {
        FormatTag::HuggingFace => Box::new(HuggingFaceAdapter),
        FormatTag::RebelJson => Box::new(RebelJsonAdapter),
    }
}

/// Fetch a string field from a raw record, defaulting to empty when absent.
pub(crate) fn str_field<'a>(record: &'a Map<String, Value>, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_adapter_dispatch_matches_tag() {
        assert_eq!(adapter_for(FormatTag::HuggingFace).format(), FormatTag::HuggingFace);
        assert_eq!(adapter_for(FormatTag::RebelJson).format(), FormatTag::RebelJson);
    }

    #[test]
    fn test_load_and_parse_skips_malformed_records() {
        // Three records, the middle one with an unusable `data` field: the
        // batch must yield exactly the two good trajectories.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rebel.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[
                {{"task": "put a mug", "done": "True", "data": []}},
                {{"task": "clean a pan", "done": "True", "data": "oops"}},
                {{"task": "heat an egg", "done": "False", "data": []}}
            ]"#
        )
        .unwrap();

        let adapter = adapter_for(FormatTag::RebelJson);
        let trajectories = adapter.load_and_parse(&path).unwrap();

        assert_eq!(trajectories.len(), 2);
        assert_eq!(trajectories[0].id, "rebel_traj_00000");
        // The surviving records keep their original positional index.
        assert_eq!(trajectories[1].id, "rebel_traj_00002");
    }
}

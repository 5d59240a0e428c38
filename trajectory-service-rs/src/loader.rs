// trajectory-service-rs/src/loader.rs
// Orchestrates detection, adapter selection and aggregation across sources.
// A failing source contributes nothing; the remaining sources still load.

use std::path::Path;

use config_rs::DataSource;

use crate::adapters::adapter_for;
use crate::detect::{detect_format, FormatTag};
use crate::error::{LoadError, LoadResult};
use crate::model::Trajectory;

/// Loads trajectory corpora from configured data sources.
#[derive(Debug, Default)]
pub struct TrajectoryLoader;

impl TrajectoryLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load one source, auto-detecting the format unless one is given.
    ///
    /// Auto-detection failure is an `UnknownFormat` error the caller may treat
    /// as skippable; an explicit `format` always wins over detection.
    pub fn load(&self, path: &Path, format: Option<FormatTag>) -> LoadResult<Vec<Trajectory>> {
        let tag = match format {
            Some(tag) => tag,
            None => detect_format(path).ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))?,
        };

        let adapter = adapter_for(tag);
        tracing::info!("loading trajectories from {} using {} adapter", path.display(), tag);
        let trajectories = adapter.load_and_parse(path)?;
        tracing::info!("loaded {} trajectories from {}", trajectories.len(), path.display());
        Ok(trajectories)
    }

    /// Load one source whose format the caller named explicitly. An unknown
    /// format name is a hard error (a caller bug, not dirty data).
    pub fn load_with_format(&self, path: &Path, format: &str) -> LoadResult<Vec<Trajectory>> {
        let tag: FormatTag = format.parse()?;
        self.load(path, Some(tag))
    }

    /// Load every configured source, in order, into one corpus.
    ///
    /// Any single source failing entirely (unrecognized format, I/O error,
    /// corrupt file) is logged and skipped; dirty data never aborts the
    /// batch. The one exception is an explicitly named unsupported format,
    /// which is a caller bug and propagates as a hard error. Corpus order is
    /// deterministic: sources in configured order, records in source order
    /// within each.
    pub fn load_many(&self, sources: &[DataSource]) -> LoadResult<Vec<Trajectory>> {
        let mut corpus = Vec::new();
        for source in sources {
            let result = match &source.format {
                Some(format) => self.load_with_format(&source.path, format),
                None => self.load(&source.path, None),
            };
            match result {
                Ok(trajectories) => corpus.extend(trajectories),
                Err(e @ LoadError::UnsupportedFormat(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!("failed to load {}: {}", source.path.display(), e);
                }
            }
        }
        Ok(corpus)
    }
}

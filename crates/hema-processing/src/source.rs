//! Dataset loading and the in-process source cache.
//!
//! A [`DatasetSource`] resolves the primary path (or its fallback), reads the
//! CSV with the configured null tokens and coerces the declared numeric
//! columns. [`SourceCache`] keeps loaded datasets keyed by resolved path so
//! repeated loads in one process read the file once.

use crate::config::SourceConfig;
use crate::error::{CleaningError, Result};
use crate::profiler::coerce_numeric;
use parking_lot::RwLock;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A raw table as read from disk, after numeric coercion.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// The path that was actually read.
    pub path: PathBuf,
    pub table: DataFrame,
    /// Declared numeric columns converted from text.
    pub coerced: Vec<String>,
    /// Declared numeric columns the file does not have.
    pub absent_numeric: Vec<String>,
    /// Cells that failed numeric parsing and were read as missing.
    pub cells_invalidated: usize,
}

/// Where the dataset lives and how to read it.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    config: SourceConfig,
}

impl DatasetSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The primary path if it exists, else the fallback if that exists.
    pub fn resolve(&self) -> Result<PathBuf> {
        if self.config.primary.exists() {
            return Ok(self.config.primary.clone());
        }

        if let Some(fallback) = &self.config.fallback
            && fallback.exists()
        {
            warn!(
                "Dataset not found at '{}', using fallback '{}'",
                self.config.primary.display(),
                fallback.display()
            );
            return Ok(fallback.clone());
        }

        Err(CleaningError::SourceNotFound {
            primary: self.config.primary.clone(),
            fallback: self.config.fallback.clone(),
        })
    }

    /// Resolve, read and coerce the dataset.
    pub fn load(&self) -> Result<LoadedDataset> {
        let path = self.resolve()?;
        self.load_from(&path)
    }

    fn load_from(&self, path: &Path) -> Result<LoadedDataset> {
        info!("Loading dataset from '{}'", path.display());
        let raw = read_csv(path, &self.config.null_values, self.config.infer_schema_length)?;
        debug!("Read {} rows x {} columns", raw.height(), raw.width());

        let coercion = coerce_numeric(&raw, &self.config.numeric_columns)?;
        if coercion.cells_invalidated > 0 {
            warn!(
                "{} cells in declared numeric columns could not be parsed and were read as missing",
                coercion.cells_invalidated
            );
        }

        Ok(LoadedDataset {
            path: path.to_path_buf(),
            table: coercion.table,
            coerced: coercion.coerced,
            absent_numeric: coercion.absent,
            cells_invalidated: coercion.cells_invalidated,
        })
    }
}

/// Read a CSV file with a header row.
///
/// Cells matching any of `null_values` (and empty cells) are read as missing.
/// Any read or parse failure is reported as [`CleaningError::SourceUnreadable`].
pub fn read_csv(path: &Path, null_values: &[String], infer_schema_length: usize) -> Result<DataFrame> {
    let unreadable = |e: PolarsError| CleaningError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let tokens: Vec<PlSmallStr> = null_values.iter().map(|s| s.as_str().into()).collect();

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(infer_schema_length))
        .map_parse_options(|opts| opts.with_null_values(Some(NullValues::AllColumns(tokens.clone()))))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(unreadable)?
        .finish()
        .map_err(unreadable)
}

/// Loaded datasets keyed by resolved source path.
///
/// Entries are immutable once inserted and never invalidated; a changed
/// file on disk is not picked up until the process restarts.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: RwLock<HashMap<PathBuf, Arc<LoadedDataset>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for this source, loading it on first use.
    pub fn get_or_load(&self, source: &DatasetSource) -> Result<Arc<LoadedDataset>> {
        let path = source.resolve()?;

        if let Some(dataset) = self.entries.read().get(&path) {
            debug!("Source cache hit for '{}'", path.display());
            return Ok(Arc::clone(dataset));
        }

        let loaded = Arc::new(source.load_from(&path)?);
        let mut entries = self.entries.write();
        // Another caller may have loaded it while we were reading.
        let dataset = entries.entry(path).or_insert(loaded);
        Ok(Arc::clone(dataset))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

static_assertions::assert_impl_all!(SourceCache: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
Patient_ID,Age,Gender,WBC,Diagnosis
P1,34,Male,6.2,AML
P2,NA,Female,high,CLL
P3,51,,9.1,
";

    fn source_for(primary: PathBuf, fallback: Option<PathBuf>) -> DatasetSource {
        let mut builder = SourceConfig::builder().primary(primary);
        builder = match fallback {
            Some(path) => builder.fallback(path),
            None => builder.no_fallback(),
        };
        DatasetSource::new(builder.build().unwrap())
    }

    #[test]
    fn test_resolve_prefers_primary() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("primary.csv");
        let fallback = dir.path().join("fallback.csv");
        fs::write(&primary, SAMPLE).unwrap();
        fs::write(&fallback, SAMPLE).unwrap();

        let source = source_for(primary.clone(), Some(fallback));
        assert_eq!(source.resolve().unwrap(), primary);
    }

    #[test]
    fn test_resolve_uses_fallback() {
        let dir = tempdir().unwrap();
        let fallback = dir.path().join("fallback.csv");
        fs::write(&fallback, SAMPLE).unwrap();

        let source = source_for(dir.path().join("missing.csv"), Some(fallback.clone()));
        assert_eq!(source.resolve().unwrap(), fallback);
    }

    #[test]
    fn test_resolve_neither_exists() {
        let dir = tempdir().unwrap();
        let source = source_for(
            dir.path().join("a.csv"),
            Some(dir.path().join("b.csv")),
        );

        let err = source.load().unwrap_err();
        assert_eq!(err.error_code(), "SOURCE_NOT_FOUND");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("b.csv"));
    }

    #[test]
    fn test_load_reads_null_tokens_and_coerces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        fs::write(&path, SAMPLE).unwrap();

        let dataset = source_for(path.clone(), None).load().unwrap();
        let table = &dataset.table;

        assert_eq!(dataset.path, path);
        assert_eq!(table.height(), 3);
        assert_eq!(table.column("Age").unwrap().null_count(), 1);
        assert_eq!(table.column("Gender").unwrap().null_count(), 1);
        assert_eq!(table.column("Diagnosis").unwrap().null_count(), 1);

        let wbc = table.column("WBC").unwrap();
        assert_eq!(wbc.dtype(), &DataType::Float64);
        assert_eq!(wbc.null_count(), 1);
        assert_eq!(dataset.cells_invalidated, 1);
        assert!(dataset.coerced.contains(&"WBC".to_string()));
        assert!(dataset.absent_numeric.contains(&"Platelets".to_string()));
    }

    #[test]
    fn test_cache_loads_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        fs::write(&path, SAMPLE).unwrap();

        let cache = SourceCache::new();
        let source = source_for(path, None);

        let first = cache.get_or_load(&source).unwrap();
        let second = cache.get_or_load(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_propagates_not_found() {
        let dir = tempdir().unwrap();
        let cache = SourceCache::new();
        let source = source_for(dir.path().join("nope.csv"), None);

        assert!(cache.get_or_load(&source).is_err());
        assert!(cache.is_empty());
    }
}

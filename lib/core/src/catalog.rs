//! Catalog corpus and CSV loading.
//!
//! A [`Corpus`] is position-addressed: the index of a record is its id for
//! the whole lifetime of an index generation. Loading preserves file order.

use crate::{CatalogRecord, Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const COL_NAME: &str = "Assessment Name";
pub const COL_JOB_LEVEL: &str = "Job Level";
pub const COL_DURATION: &str = "Duration";
pub const COL_REMOTE_TESTING: &str = "Remote Testing";
pub const COL_ADAPTIVE_SUPPORT: &str = "Adaptive Support";
pub const COL_URL: &str = "URL";

/// Ordered, immutable sequence of catalog records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    records: Vec<CatalogRecord>,
}

impl Corpus {
    #[must_use]
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&CatalogRecord> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogRecord> {
        self.records.iter()
    }
}

impl From<Vec<CatalogRecord>> for Corpus {
    fn from(records: Vec<CatalogRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a CatalogRecord;
    type IntoIter = std::slice::Iter<'a, CatalogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parse a yes/no catalog flag. Only "Yes" counts as true.
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

/// Header positions of the columns we read. Only the name column is required.
struct ColumnMap {
    name: usize,
    job_level: Option<usize>,
    duration: Option<usize>,
    remote_testing: Option<usize>,
    adaptive_support: Option<usize>,
    url: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |column: &str| headers.iter().position(|h| h.trim() == column);
        let name = find(COL_NAME)
            .ok_or_else(|| Error::Catalog(format!("missing required column '{}'", COL_NAME)))?;

        Ok(Self {
            name,
            job_level: find(COL_JOB_LEVEL),
            duration: find(COL_DURATION),
            remote_testing: find(COL_REMOTE_TESTING),
            adaptive_support: find(COL_ADAPTIVE_SUPPORT),
            url: find(COL_URL),
        })
    }

    fn record(&self, row: &csv::StringRecord) -> CatalogRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|v| v.to_string())
                .unwrap_or_default()
        };

        CatalogRecord::new(cell(Some(self.name)), cell(self.job_level))
            .with_duration(cell(self.duration))
            .with_remote_testing(parse_flag(&cell(self.remote_testing)))
            .with_adaptive_support(parse_flag(&cell(self.adaptive_support)))
            .with_source_url(cell(self.url))
    }
}

/// Read a catalog CSV (with header row) from any reader.
pub fn read_catalog<R: Read>(reader: R) -> Result<Corpus> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    for row in csv_reader.records() {
        records.push(columns.record(&row?));
    }

    debug!("Parsed {} catalog rows", records.len());
    Ok(Corpus::new(records))
}

/// Load a catalog CSV from disk.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Corpus> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Catalog(format!("cannot open {}: {}", path.display(), e)))?;
    let corpus = read_catalog(std::io::BufReader::new(file))?;
    info!("Loaded {} assessments from {}", corpus.len(), path.display());
    Ok(corpus)
}

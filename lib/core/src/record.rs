use serde::{Deserialize, Serialize};

/// One assessment from the catalog.
///
/// Every field is an opaque string as far as matching is concerned; values
/// such as `"N/A"` are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub name: String,
    pub job_level: String,
    pub duration: String,
    pub remote_testing: bool,
    pub adaptive_support: bool,
    pub source_url: String,
}

impl CatalogRecord {
    pub fn new(name: impl Into<String>, job_level: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_level: job_level.into(),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_remote_testing(mut self, remote: bool) -> Self {
        self.remote_testing = remote;
        self
    }

    pub fn with_adaptive_support(mut self, adaptive: bool) -> Self {
        self.adaptive_support = adaptive;
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Text that gets indexed: name and job level separated by one space.
    pub fn indexed_text(&self) -> String {
        format!("{} {}", self.name, self.job_level)
    }
}

/// Category reported for every recommendation; the catalog has no finer one.
pub const DEFAULT_CATEGORY: &str = "Assessment";

/// A ranked catalog entry returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    /// Corpus position of the record within the index generation.
    pub id: String,
    pub title: String,
    pub category: String,
    pub job_level: String,
    pub duration: String,
    pub remote_testing_available: bool,
    pub adaptive_support: bool,
    pub url: String,
    pub similarity_score: f32,
}

impl RecommendationRecord {
    pub fn from_catalog(position: usize, record: &CatalogRecord, score: f32) -> Self {
        Self {
            id: position.to_string(),
            title: record.name.clone(),
            category: DEFAULT_CATEGORY.to_string(),
            job_level: record.job_level.clone(),
            duration: record.duration.clone(),
            remote_testing_available: record.remote_testing,
            adaptive_support: record.adaptive_support,
            url: record.source_url.clone(),
            similarity_score: score.clamp(0.0, 1.0),
        }
    }
}

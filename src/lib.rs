//! # AssessMatch
//!
//! Recommends assessments from a catalog for a free-text job description.
//!
//! Every catalog entry (name + job level) is normalized and placed in a tf-idf
//! vector space over unigrams and bigrams. A query goes through the same
//! normalization, is weighed into the same space, and the catalog is ranked
//! by cosine similarity with a stable tiebreak on catalog order.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! assessmatch --catalog assessments.csv --http-port 5000
//! curl -X POST localhost:5000/api/recommend \
//!      -H 'content-type: application/json' \
//!      -d '{"job_description": "graduate analyst with strong numerical reasoning"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use assessmatch::prelude::*;
//!
//! let manager = IndexManager::open(StorageConfig {
//!     catalog_path: "assessments.csv".into(),
//!     index_path: "assessment_index.bin".into(),
//!     ..Default::default()
//! }).unwrap();
//!
//! for rec in manager.recommend("java developer", Some(5)).unwrap() {
//!     println!("{} ({:.3})", rec.title, rec.similarity_score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `assessmatch-core` - Normalizer, tf-idf vector space, ranker, recommender
//! - `assessmatch-storage` - Index artifact store and load-or-build manager
//! - `assessmatch-api` - REST API

// Re-export core types
pub use assessmatch_core::{
    CatalogRecord, Corpus, RecommendationRecord,
    TextNormalizer, TfidfConfig, TfidfVectorizer, VectorSpaceModel, DocumentMatrix,
    SparseVector, ScoredPosition, PersistedIndex, Recommender,
    Error, Result, DEFAULT_TOP_N,
};

// Re-export storage
pub use assessmatch_storage::{IndexManager, IndexStore, StorageConfig};

// Re-export API
pub use assessmatch_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CatalogRecord, Corpus, RecommendationRecord,
        TfidfConfig, Recommender,
        Error, Result,
        IndexManager, IndexStore, StorageConfig,
        RestApi,
    };
}

/// Ranking primitives
pub mod ranking {
    pub use assessmatch_core::ranker::rank;
}

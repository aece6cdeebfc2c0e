//! # AssessMatch Core
//!
//! Core library for the AssessMatch recommender.
//!
//! This crate provides the matching pipeline:
//!
//! - [`TextNormalizer`] - Lowercasing, character stripping, stop-word removal
//! - [`TfidfVectorizer`] - Fits a [`VectorSpaceModel`] and [`DocumentMatrix`] over a [`Corpus`]
//! - [`ranker::rank`] - Cosine ranking with a stable tiebreak on corpus position
//! - [`PersistedIndex`] - One index generation (model + corpus + matrix)
//! - [`Recommender`] - Job description in, ranked [`RecommendationRecord`]s out
//!
//! ## Example
//!
//! ```rust
//! use assessmatch_core::{CatalogRecord, Corpus, Recommender, TfidfConfig};
//!
//! let corpus = Corpus::new(vec![
//!     CatalogRecord::new("Verify Numerical Reasoning", "Entry"),
//!     CatalogRecord::new("Verify Verbal Reasoning", "Entry"),
//! ]);
//! let recommender = Recommender::fit(corpus, TfidfConfig::default()).unwrap();
//!
//! let results = recommender.recommend("numerical reasoning entry level test", None).unwrap();
//! assert_eq!(results[0].title, "Verify Numerical Reasoning");
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod index;
pub mod normalizer;
pub mod ranker;
pub mod record;
pub mod stopwords;
pub mod vector;
pub mod vectorizer;

pub use catalog::{load_catalog, read_catalog, Corpus};
pub use engine::Recommender;
pub use error::{Error, Result};
pub use index::PersistedIndex;
pub use normalizer::TextNormalizer;
pub use ranker::{ScoredPosition, DEFAULT_TOP_N};
pub use record::{CatalogRecord, RecommendationRecord};
pub use stopwords::StopWords;
pub use vector::SparseVector;
pub use vectorizer::{DocumentMatrix, TfidfConfig, TfidfVectorizer, VectorSpaceModel, DEFAULT_MAX_FEATURES};

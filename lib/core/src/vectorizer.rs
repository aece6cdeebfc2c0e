//! TF-IDF vector space.
//!
//! ```text
//! tfidf(t, d) = tf(t, d) × idf(t)
//! idf(t)      = ln((1 + N) / (1 + df(t))) + 1
//! ```
//!
//! `tf` is the raw count of term `t` in document `d`, `N` the number of
//! documents and `df(t)` the number of documents containing `t`. The `+ 1`
//! keeps a term that occurs everywhere at a small positive weight. Every
//! document vector is L2-normalized after weighting.
//!
//! The vocabulary is capped at [`TfidfConfig::max_features`] terms, ranked by
//! aggregate tf-idf weight over the corpus. Once fitted, a
//! [`VectorSpaceModel`] never changes; unseen terms at transform time are
//! ignored.

use crate::{Corpus, Error, Result, SparseVector, TextNormalizer};
use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Configuration for fitting a vector space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Upper bound on vocabulary size.
    pub max_features: usize,
    /// Inclusive n-gram range; `(1, 2)` indexes unigrams and bigrams.
    pub ngram_range: (usize, usize),
    /// Tokens shorter than this (in characters) are not indexed.
    pub min_token_len: usize,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            ngram_range: (1, 2),
            min_token_len: 2,
        }
    }
}

impl TfidfConfig {
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::InvalidConfig("max_features must be positive".into()));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::InvalidConfig(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(())
    }

    /// Split normalized text into index terms: tokens of at least
    /// `min_token_len` characters, expanded into n-grams joined by a space.
    pub fn analyze(&self, normalized: &str) -> Vec<String> {
        let tokens: Vec<&str> = normalized
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 0 {
                continue;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn term_counts(&self, normalized: &str) -> AHashMap<String, u32> {
        let mut counts: AHashMap<String, u32> = AHashMap::new();
        for term in self.analyze(normalized) {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }
}

/// Fitted vocabulary and idf weights. Immutable after fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSpaceModel {
    config: TfidfConfig,
    /// Dimension -> term, in lexicographic order.
    terms: Vec<String>,
    vocabulary: BTreeMap<String, u32>,
    /// Dimension -> idf.
    idf: Vec<f32>,
    n_documents: usize,
}

impl VectorSpaceModel {
    fn empty(config: TfidfConfig, n_documents: usize) -> Self {
        Self {
            config,
            terms: Vec::new(),
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents,
        }
    }

    /// A model with no vocabulary cannot place any text in its space.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.terms.len()
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, u32> {
        &self.vocabulary
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary
            .get(term)
            .and_then(|&dim| self.idf.get(dim as usize).copied())
    }

    /// Internal consistency of a model that did not come from `fit`: the
    /// term list, idf weights and vocabulary describe the same dimensions.
    pub fn validate(&self) -> Result<()> {
        let corrupt = |message: String| Error::CorruptIndex(format!("model: {}", message));

        self.config
            .validate()
            .map_err(|e| corrupt(e.to_string()))?;
        if self.terms.len() != self.idf.len() || self.terms.len() != self.vocabulary.len() {
            return Err(corrupt(format!(
                "{} terms, {} idf weights, {} vocabulary entries",
                self.terms.len(),
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        for (term, &dim) in &self.vocabulary {
            if self.terms.get(dim as usize) != Some(term) {
                return Err(corrupt(format!("term '{}' maps to dimension {}", term, dim)));
            }
        }
        if let Some(dim) = self.idf.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(corrupt(format!("invalid idf weight at dimension {}", dim)));
        }
        Ok(())
    }

    /// Weigh pre-normalized text into this space. Unknown terms are ignored.
    pub fn transform(&self, normalized: &str) -> Result<SparseVector> {
        if self.is_empty() {
            return Err(Error::NotTrained);
        }
        Ok(self.weigh(&self.config.term_counts(normalized)))
    }

    fn weigh(&self, counts: &AHashMap<String, u32>) -> SparseVector {
        let entries: Vec<(u32, f32)> = counts
            .iter()
            .filter_map(|(term, &tf)| {
                let dim = *self.vocabulary.get(term)?;
                let idf = self.idf.get(dim as usize)?;
                Some((dim, tf as f32 * idf))
            })
            .collect();
        SparseVector::new(entries).normalized()
    }
}

/// One unit-length vector per corpus record, aligned by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatrix {
    rows: Vec<SparseVector>,
}

impl DocumentMatrix {
    pub fn new(rows: Vec<SparseVector>) -> Self {
        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn row(&self, position: usize) -> Option<&SparseVector> {
        self.rows.get(position)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }
}

/// Fits a [`VectorSpaceModel`] over a catalog corpus.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    normalizer: TextNormalizer,
}

impl TfidfVectorizer {
    pub fn new(config: TfidfConfig, normalizer: TextNormalizer) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Fit over the indexed text (name + job level) of every record.
    pub fn fit(&self, corpus: &Corpus) -> Result<(VectorSpaceModel, DocumentMatrix)> {
        let documents: Vec<String> = corpus
            .records()
            .par_iter()
            .map(|record| self.normalizer.normalize(&record.indexed_text()))
            .collect();
        self.fit_normalized(&documents)
    }

    /// Fit over documents that have already been normalized.
    pub fn fit_normalized<S: AsRef<str> + Sync>(
        &self,
        documents: &[S],
    ) -> Result<(VectorSpaceModel, DocumentMatrix)> {
        let n_docs = documents.len();
        if n_docs == 0 {
            warn!("Fitting on an empty corpus; model will be marked empty");
            return Ok((
                VectorSpaceModel::empty(self.config.clone(), 0),
                DocumentMatrix::default(),
            ));
        }

        let doc_counts: Vec<AHashMap<String, u32>> = documents
            .par_iter()
            .map(|doc| self.config.term_counts(doc.as_ref()))
            .collect();

        let mut doc_freq: AHashMap<&str, u32> = AHashMap::new();
        let mut total_freq: AHashMap<&str, u64> = AHashMap::new();
        for counts in &doc_counts {
            for (term, &tf) in counts {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                *total_freq.entry(term.as_str()).or_insert(0) += u64::from(tf);
            }
        }

        let smooth_idf = |df: u32| -> f64 {
            ((1.0 + n_docs as f64) / (1.0 + f64::from(df))).ln() + 1.0
        };

        // Rank candidates by aggregate weight: sum_d tf(t, d) * idf(t).
        let mut candidates: Vec<(&str, f64, f64)> = doc_freq
            .iter()
            .map(|(&term, &df)| {
                let idf = smooth_idf(df);
                let weight = total_freq.get(term).copied().unwrap_or(0) as f64 * idf;
                (term, weight, idf)
            })
            .collect();

        if let Some((term, ..)) = candidates
            .iter()
            .find(|(_, weight, idf)| !weight.is_finite() || !idf.is_finite())
        {
            return Err(Error::computation(
                "fit",
                format!("non-finite weight for term '{}'", term),
            ));
        }

        let distinct = candidates.len();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(self.config.max_features);
        candidates.sort_by(|a, b| a.0.cmp(b.0));

        if distinct > candidates.len() {
            debug!(
                "Vocabulary capped: kept {} of {} terms",
                candidates.len(),
                distinct
            );
        }

        if candidates.is_empty() {
            warn!("No indexable terms in {} documents; model will be marked empty", n_docs);
            return Ok((
                VectorSpaceModel::empty(self.config.clone(), n_docs),
                DocumentMatrix::new(vec![SparseVector::zero(); n_docs]),
            ));
        }

        let mut terms = Vec::with_capacity(candidates.len());
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(candidates.len());
        for (dim, (term, _, term_idf)) in candidates.into_iter().enumerate() {
            terms.push(term.to_string());
            vocabulary.insert(term.to_string(), dim as u32);
            idf.push(term_idf as f32);
        }

        let model = VectorSpaceModel {
            config: self.config.clone(),
            terms,
            vocabulary,
            idf,
            n_documents: n_docs,
        };

        let rows: Vec<SparseVector> = doc_counts.par_iter().map(|c| model.weigh(c)).collect();

        info!(
            "Fitted vector space: {} documents, {} terms",
            n_docs,
            model.dim()
        );
        Ok((model, DocumentMatrix::new(rows)))
    }

    /// Normalize raw text and weigh it into `model`'s space.
    pub fn transform(&self, model: &VectorSpaceModel, text: &str) -> Result<SparseVector> {
        model.transform(&self.normalizer.normalize(text))
    }
}

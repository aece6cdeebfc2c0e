//! Query path: normalize, weigh into the fitted space, rank, and map
//! positions back to catalog records.

use crate::ranker::{self, DEFAULT_TOP_N};
use crate::{
    Corpus, Error, PersistedIndex, RecommendationRecord, Result, TextNormalizer, TfidfConfig,
    TfidfVectorizer,
};
use tracing::debug;

/// Read-only recommender over one index generation.
///
/// Shared between request handlers as `Arc<Recommender>`; nothing in it is
/// mutated after construction, so queries need no locking.
#[derive(Debug, Clone)]
pub struct Recommender {
    index: PersistedIndex,
    normalizer: TextNormalizer,
}

impl Recommender {
    /// Fit a new generation over `corpus`.
    pub fn fit(corpus: Corpus, config: TfidfConfig) -> Result<Self> {
        let normalizer = TextNormalizer::english();
        let vectorizer = TfidfVectorizer::new(config, normalizer.clone())?;
        let index = PersistedIndex::build(corpus, &vectorizer)?;
        Ok(Self { index, normalizer })
    }

    /// Wrap a generation restored from storage.
    pub fn from_index(index: PersistedIndex) -> Result<Self> {
        index.validate()?;
        Ok(Self {
            index,
            normalizer: TextNormalizer::english(),
        })
    }

    pub fn index(&self) -> &PersistedIndex {
        &self.index
    }

    pub fn is_trained(&self) -> bool {
        !self.index.model.is_empty()
    }

    /// Rank the catalog against a job description.
    ///
    /// `top_n` defaults to [`DEFAULT_TOP_N`]; fewer records come back when the
    /// catalog is smaller.
    pub fn recommend(&self, job_description: &str, top_n: Option<usize>) -> Result<Vec<RecommendationRecord>> {
        if !self.is_trained() {
            return Err(Error::NotTrained);
        }

        let tokens = self.normalizer.tokens(job_description);
        if tokens.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let query = self.index.model.transform(&tokens.join(" "))?;
        debug!("Query vector has {} non-zero terms", query.nnz());

        let ranked = ranker::rank(&query, &self.index.matrix, top_n.unwrap_or(DEFAULT_TOP_N))?;

        ranked
            .into_iter()
            .map(|hit| {
                self.index
                    .corpus
                    .get(hit.position)
                    .map(|record| RecommendationRecord::from_catalog(hit.position, record, hit.score))
                    .ok_or_else(|| {
                        Error::computation(
                            "rank",
                            format!("position {} outside corpus", hit.position),
                        )
                    })
            })
            .collect()
    }
}

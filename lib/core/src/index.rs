use crate::{Corpus, DocumentMatrix, Error, Result, TfidfVectorizer, VectorSpaceModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One index generation: the fitted space, the corpus it was fitted on and
/// the document vectors, kept together so positions always line up.
///
/// A re-fit produces a new `PersistedIndex`; an existing one is never
/// modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedIndex {
    pub model: VectorSpaceModel,
    pub corpus: Corpus,
    pub matrix: DocumentMatrix,
    pub built_at: DateTime<Utc>,
}

impl PersistedIndex {
    /// Fit a fresh generation over `corpus`.
    pub fn build(corpus: Corpus, vectorizer: &TfidfVectorizer) -> Result<Self> {
        let (model, matrix) = vectorizer.fit(&corpus)?;
        Self::from_parts(model, corpus, matrix)
    }

    /// Assemble a generation, checking that the three parts agree.
    pub fn from_parts(model: VectorSpaceModel, corpus: Corpus, matrix: DocumentMatrix) -> Result<Self> {
        let index = Self {
            model,
            corpus,
            matrix,
            built_at: Utc::now(),
        };
        index.validate()?;
        Ok(index)
    }

    /// Model consistency, positional alignment and dimension bounds. A
    /// mismatch means the parts come from different generations or the
    /// artifact was altered.
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        if self.corpus.len() != self.matrix.len() {
            return Err(Error::CorruptIndex(format!(
                "corpus has {} records but matrix has {} rows",
                self.corpus.len(),
                self.matrix.len()
            )));
        }
        if self.model.n_documents() != self.corpus.len() {
            return Err(Error::CorruptIndex(format!(
                "model was fitted on {} documents, corpus has {}",
                self.model.n_documents(),
                self.corpus.len()
            )));
        }
        if let Some(position) = self.matrix.rows().iter().position(|row| !row.is_well_formed()) {
            return Err(Error::CorruptIndex(format!("row {} is malformed", position)));
        }
        let dim = self.model.dim() as u32;
        if let Some(position) = self
            .matrix
            .rows()
            .iter()
            .position(|row| row.indices().last().is_some_and(|&d| d >= dim))
        {
            return Err(Error::CorruptIndex(format!(
                "row {} references a dimension outside the vocabulary",
                position
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogRecord, SparseVector};

    fn corpus() -> Corpus {
        Corpus::new(vec![
            CatalogRecord::new("Verify Numerical Reasoning", "Entry"),
            CatalogRecord::new("Verify Verbal Reasoning", "Entry"),
        ])
    }

    #[test]
    fn test_build_aligns_parts() {
        let index = PersistedIndex::build(corpus(), &TfidfVectorizer::default()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.matrix.len(), 2);
        assert!(index.validate().is_ok());
    }

    #[test]
    fn test_misaligned_parts_rejected() {
        let vectorizer = TfidfVectorizer::default();
        let (model, mut matrix) = vectorizer.fit(&corpus()).unwrap();
        matrix = DocumentMatrix::new(matrix.rows()[..1].to_vec());
        let err = PersistedIndex::from_parts(model, corpus(), matrix).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex(_)));
    }

    #[test]
    fn test_out_of_range_dimension_rejected() {
        let vectorizer = TfidfVectorizer::default();
        let (model, _) = vectorizer.fit(&corpus()).unwrap();
        let bogus = SparseVector::new(vec![(model.dim() as u32 + 5, 1.0)]);
        let matrix = DocumentMatrix::new(vec![bogus.clone(), bogus]);
        let err = PersistedIndex::from_parts(model, corpus(), matrix).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex(_)));
    }

    #[test]
    fn test_malformed_row_rejected() {
        let index = PersistedIndex::build(corpus(), &TfidfVectorizer::default()).unwrap();
        let mut value = serde_json::to_value(&index).unwrap();
        value["matrix"]["rows"][0]["values"] = serde_json::json!([]);
        let tampered: PersistedIndex = serde_json::from_value(value).unwrap();
        assert!(matches!(tampered.validate(), Err(Error::CorruptIndex(_))));
    }

    #[test]
    fn test_inconsistent_model_rejected() {
        let index = PersistedIndex::build(corpus(), &TfidfVectorizer::default()).unwrap();
        let mut value = serde_json::to_value(&index).unwrap();
        value["model"]["idf"] = serde_json::json!([]);
        let tampered: PersistedIndex = serde_json::from_value(value).unwrap();
        assert!(matches!(tampered.validate(), Err(Error::CorruptIndex(_))));
    }
}

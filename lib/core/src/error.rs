use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty query: the job description contains no searchable terms")]
    EmptyQuery,

    #[error("Model not trained: the vector space has no vocabulary")]
    NotTrained,

    #[error("Engine not initialized: no index generation is loaded")]
    NotInitialized,

    #[error("Corrupt or incompatible index: {0}")]
    CorruptIndex(String),

    #[error("Index not found: {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Computation failed during {stage}: {message}")]
    Computation { stage: &'static str, message: String },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn computation(stage: &'static str, message: impl Into<String>) -> Self {
        Error::Computation {
            stage,
            message: message.into(),
        }
    }

    /// Conditions a caller can fix by changing its input or waiting for a build.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::EmptyQuery | Error::NotTrained | Error::NotInitialized
        )
    }

    /// Conditions the index manager answers with a fresh build instead of an error.
    pub fn requires_rebuild(&self) -> bool {
        matches!(self, Error::CorruptIndex(_) | Error::IndexNotFound(_))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        match e.position() {
            Some(pos) => Error::Catalog(format!("line {}: {}", pos.line(), e)),
            None => Error::Catalog(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_classification() {
        assert!(Error::CorruptIndex("bad magic".into()).requires_rebuild());
        assert!(Error::IndexNotFound(PathBuf::from("x.bin")).requires_rebuild());
        assert!(!Error::NotTrained.requires_rebuild());
        assert!(!Error::computation("fit", "nan").requires_rebuild());
    }

    #[test]
    fn test_computation_names_stage() {
        let err = Error::computation("rank", "dimension overflow");
        assert_eq!(
            err.to_string(),
            "Computation failed during rank: dimension overflow"
        );
        assert!(!err.is_recoverable());
        assert!(Error::EmptyQuery.is_recoverable());
    }
}

//! Errors raised while acquiring passage content.
//!
//! Only the repository layer produces these. The reading engine, selection
//! set and session operations are total and never fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::passage::SentenceId;

/// The data source could not be reached or the requested record is absent.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Unreachable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Passage '{id}' not found")]
    NotFound { id: String },

    #[error("Passage index {} is malformed: {source}", path.display())]
    MalformedIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The source content was reachable but could not be turned into a passage.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No content")]
    NoContent,

    #[error("Row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("Row {row}: sentence_id '{value}' is not a number")]
    InvalidSentenceId { row: usize, value: String },

    #[error("Row {row}: chunk_index '{value}' is not a number")]
    InvalidChunkIndex { row: usize, value: String },

    #[error("Sentence {sentence_id} has no chunks")]
    EmptySentence { sentence_id: SentenceId },

    #[error("Sentence {sentence_id} appears more than once")]
    DuplicateSentence { sentence_id: SentenceId },

    #[error("Invalid passage JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid passage CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Anything a [`crate::repository::PassageRepository`] can fail with.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::Load(LoadError::NotFound { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_is_transparent() {
        let err: RepositoryError = ParseError::NoContent.into();
        assert_eq!(err.to_string(), "No content");

        let err: RepositoryError = LoadError::NotFound { id: "p1".to_string() }.into();
        assert_eq!(err.to_string(), "Passage 'p1' not found");
        assert!(err.is_not_found());
    }
}

//! Passage data model: chunks, sentences, passages and the index entries
//! used to pick one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Stable sentence identifier, unique within a passage.
pub type SentenceId = i64;

/// Smallest revealable unit: a piece of source text and its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(alias = "en")]
    pub source: String,
    #[serde(alias = "ko")]
    pub translation: String,
}

impl Chunk {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    sentence_id: SentenceId,
    chunks: Vec<Chunk>,
}

impl Sentence {
    pub fn new(sentence_id: SentenceId, chunks: Vec<Chunk>) -> Self {
        Self { sentence_id, chunks }
    }

    pub fn id(&self) -> SentenceId {
        self.sentence_id
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Index of the final chunk. Sentences built through [`Passage::new`]
    /// always have at least one chunk.
    pub fn last_chunk_index(&self) -> usize {
        self.chunks.len().saturating_sub(1)
    }

    /// Source text of every chunk joined into one line, whitespace collapsed.
    pub fn plain_text(&self) -> String {
        let joined = self
            .chunks
            .iter()
            .map(|c| c.source.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        joined.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Summary record shown in the passage list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
}

/// A titled passage. Sentences are kept sorted ascending by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    id: String,
    title: String,
    sentences: Vec<Sentence>,
}

impl Passage {
    /// Build a passage, sorting sentences by id.
    ///
    /// Rejects empty passages, sentences without chunks and repeated ids.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        mut sentences: Vec<Sentence>,
    ) -> Result<Self, ParseError> {
        if sentences.is_empty() {
            return Err(ParseError::NoContent);
        }

        sentences.sort_by_key(|s| s.sentence_id);

        let mut seen = HashSet::new();
        for sentence in &sentences {
            if sentence.chunks.is_empty() {
                return Err(ParseError::EmptySentence {
                    sentence_id: sentence.sentence_id,
                });
            }
            if !seen.insert(sentence.sentence_id) {
                return Err(ParseError::DuplicateSentence {
                    sentence_id: sentence.sentence_id,
                });
            }
        }

        Ok(Self {
            id: id.into(),
            title: title.into(),
            sentences,
        })
    }

    /// Group flat chunk rows into sentences.
    ///
    /// Rows may arrive in any order; they are stably sorted by
    /// `(sentence_id, chunk_index)` first, so rows sharing both keys keep
    /// their file order.
    pub fn from_rows(
        id: impl Into<String>,
        title: impl Into<String>,
        mut rows: Vec<ChunkRow>,
    ) -> Result<Self, ParseError> {
        if rows.is_empty() {
            return Err(ParseError::NoContent);
        }

        rows.sort_by_key(|r| (r.sentence_id, r.chunk_index));

        let mut sentences: Vec<Sentence> = Vec::new();
        for row in rows {
            let chunk = Chunk::new(row.source, row.translation);
            match sentences.last_mut() {
                Some(last) if last.sentence_id == row.sentence_id => last.chunks.push(chunk),
                _ => sentences.push(Sentence::new(row.sentence_id, vec![chunk])),
            }
        }

        Self::new(id, title, sentences)
    }

    /// Parse the JSON passage format:
    /// `{ "passage_id", "title", "sentences": [{ "sentence_id", "chunks": [{ "en", "ko" }] }] }`.
    pub fn from_json(content: &str) -> Result<Self, ParseError> {
        if content.trim().is_empty() {
            return Err(ParseError::NoContent);
        }
        let raw: RawPassage = serde_json::from_str(content)?;
        Self::new(raw.id, raw.title, raw.sentences)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn contains(&self, sentence_id: SentenceId) -> bool {
        self.sentences
            .binary_search_by_key(&sentence_id, |s| s.sentence_id)
            .is_ok()
    }

    pub fn index_entry(&self) -> IndexEntry {
        IndexEntry {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

#[derive(Deserialize)]
struct RawPassage {
    #[serde(alias = "passage_id")]
    id: String,
    title: String,
    sentences: Vec<Sentence>,
}

/// One flat row of tabular passage data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRow {
    pub sentence_id: SentenceId,
    pub chunk_index: i64,
    pub source: String,
    pub translation: String,
}

/// Coerce a textual identifier into an integer.
///
/// Accepts surrounding whitespace and integral decimals such as `"3.0"`.
pub fn coerce_id(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sentence_id: i64, chunk_index: i64, source: &str) -> ChunkRow {
        ChunkRow {
            sentence_id,
            chunk_index,
            source: source.to_string(),
            translation: format!("{}-ko", source),
        }
    }

    #[test]
    fn test_from_rows_sorts_unordered_input() {
        let rows = vec![
            row(2, 1, "b1"),
            row(1, 1, "a1"),
            row(1, 0, "a0"),
            row(2, 0, "b0"),
        ];
        let passage = Passage::from_rows("p", "Title", rows).unwrap();

        let ids: Vec<_> = passage.sentences().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2]);

        let first: Vec<_> = passage.sentences()[0].chunks().iter().map(|c| c.source.as_str()).collect();
        assert_eq!(first, vec!["a0", "a1"]);
        let second: Vec<_> = passage.sentences()[1].chunks().iter().map(|c| c.source.as_str()).collect();
        assert_eq!(second, vec!["b0", "b1"]);
    }

    #[test]
    fn test_from_rows_ties_keep_file_order() {
        let rows = vec![row(1, 0, "first"), row(1, 0, "second")];
        let passage = Passage::from_rows("p", "Title", rows).unwrap();
        let sources: Vec<_> = passage.sentences()[0].chunks().iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["first", "second"]);
    }

    #[test]
    fn test_from_rows_empty_is_no_content() {
        let err = Passage::from_rows("p", "Title", Vec::new()).unwrap_err();
        assert!(matches!(err, ParseError::NoContent));
    }

    #[test]
    fn test_new_sorts_sentences_by_id() {
        let passage = Passage::new(
            "p",
            "Title",
            vec![
                Sentence::new(9, vec![Chunk::new("nine", "")]),
                Sentence::new(-1, vec![Chunk::new("minus", "")]),
                Sentence::new(4, vec![Chunk::new("four", "")]),
            ],
        )
        .unwrap();
        let ids: Vec<_> = passage.sentences().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![-1, 4, 9]);
        assert!(passage.contains(4));
        assert!(!passage.contains(5));
    }

    #[test]
    fn test_new_rejects_empty_sentence_and_duplicates() {
        let err = Passage::new("p", "t", vec![Sentence::new(1, Vec::new())]).unwrap_err();
        assert!(matches!(err, ParseError::EmptySentence { sentence_id: 1 }));

        let err = Passage::new(
            "p",
            "t",
            vec![
                Sentence::new(1, vec![Chunk::new("a", "")]),
                Sentence::new(1, vec![Chunk::new("b", "")]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateSentence { sentence_id: 1 }));
    }

    #[test]
    fn test_from_json_accepts_original_field_names() {
        let json = r#"{
            "passage_id": "p1",
            "title": "Morning",
            "sentences": [
                { "sentence_id": 2, "chunks": [{ "en": "It rained", "ko": "비가 왔다" }] },
                { "sentence_id": 1, "chunks": [
                    { "en": "I woke up", "ko": "나는 일어났다" },
                    { "en": "early.", "ko": "일찍." }
                ] }
            ]
        }"#;
        let passage = Passage::from_json(json).unwrap();
        assert_eq!(passage.id(), "p1");
        assert_eq!(passage.title(), "Morning");
        assert_eq!(passage.sentences()[0].id(), 1);
        assert_eq!(passage.sentences()[0].chunks()[1].translation, "일찍.");
    }

    #[test]
    fn test_from_json_empty_is_no_content() {
        assert!(matches!(Passage::from_json("  \n"), Err(ParseError::NoContent)));
        assert!(matches!(Passage::from_json("{"), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_plain_text_collapses_whitespace() {
        let sentence = Sentence::new(
            1,
            vec![
                Chunk::new("  The cat ", ""),
                Chunk::new("", ""),
                Chunk::new("sat\t on   the mat.", ""),
            ],
        );
        assert_eq!(sentence.plain_text(), "The cat sat on the mat.");
    }

    #[test]
    fn test_coerce_id() {
        assert_eq!(coerce_id("3"), Some(3));
        assert_eq!(coerce_id(" 12 "), Some(12));
        assert_eq!(coerce_id("4.0"), Some(4));
        assert_eq!(coerce_id("4.5"), None);
        assert_eq!(coerce_id("abc"), None);
        assert_eq!(coerce_id(""), None);
    }
}

//! Passage acquisition.
//!
//! [`FsRepository`] reads a directory laid out as
//!
//! ```text
//! passages/
//!   index.json      [{ "id": "...", "title": "..." }, ...]
//!   <id>.json       full passage document
//!   <id>.csv        sentence_id,chunk_index,en,ko rows
//! ```
//!
//! [`MemoryRepository`] holds passages in memory.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{LoadError, ParseError, RepositoryError};
use crate::passage::{coerce_id, ChunkRow, IndexEntry, Passage};

pub const INDEX_FILE: &str = "index.json";

/// Source of passages. Both calls may suspend; everything else in the
/// crate is synchronous.
pub trait PassageRepository {
    fn list_passages(&self) -> impl Future<Output = Result<Vec<IndexEntry>, RepositoryError>> + Send;

    fn get_passage(&self, id: &str) -> impl Future<Output = Result<Passage, RepositoryError>> + Send;
}

#[derive(Debug, Clone)]
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file, mapping "does not exist" to `None`.
    async fn read_optional(path: &Path) -> Result<Option<String>, LoadError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LoadError::Unreachable {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn title_for(&self, id: &str) -> String {
        match self.list_passages().await {
            Ok(entries) => entries
                .into_iter()
                .find(|e| e.id == id)
                .map(|e| e.title)
                .unwrap_or_else(|| id.to_string()),
            Err(e) => {
                warn!(id, error = %e, "Could not read index for passage title");
                id.to_string()
            }
        }
    }
}

impl PassageRepository for FsRepository {
    async fn list_passages(&self) -> Result<Vec<IndexEntry>, RepositoryError> {
        let path = self.root.join(INDEX_FILE);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Unreachable {
                path: path.clone(),
                source,
            })?;

        let entries: Vec<IndexEntry> = serde_json::from_str(&content)
            .map_err(|source| LoadError::MalformedIndex { path, source })?;

        debug!(count = entries.len(), root = %self.root.display(), "Loaded passage index");
        Ok(entries)
    }

    async fn get_passage(&self, id: &str) -> Result<Passage, RepositoryError> {
        if !is_safe_id(id) {
            return Err(LoadError::NotFound { id: id.to_string() }.into());
        }

        let json_path = self.root.join(format!("{}.json", id));
        if let Some(content) = Self::read_optional(&json_path).await? {
            let passage = Passage::from_json(&content)?;
            if passage.id() != id {
                warn!(requested = id, found = passage.id(), "Passage file id differs from requested id");
            }
            debug!(id, sentences = passage.sentences().len(), "Loaded JSON passage");
            return Ok(passage);
        }

        let csv_path = self.root.join(format!("{}.csv", id));
        if let Some(content) = Self::read_optional(&csv_path).await? {
            let rows = parse_csv_rows(&content)?;
            let title = self.title_for(id).await;
            let passage = Passage::from_rows(id, title, rows)?;
            debug!(id, sentences = passage.sentences().len(), "Loaded CSV passage");
            return Ok(passage);
        }

        Err(LoadError::NotFound { id: id.to_string() }.into())
    }
}

fn is_safe_id(id: &str) -> bool {
    !id.is_empty() && !id.contains("..") && !id.contains('/') && !id.contains('\\')
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Parse `sentence_id,chunk_index,en,ko` rows. Column order is taken from
/// the header; `source`/`translation` are accepted for `en`/`ko`.
pub fn parse_csv_rows(content: &str) -> Result<Vec<ChunkRow>, ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::NoContent);
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let sentence_col = find_column(&headers, &["sentence_id"])
        .ok_or(ParseError::MissingField { row: 0, field: "sentence_id" })?;
    let chunk_col = find_column(&headers, &["chunk_index"])
        .ok_or(ParseError::MissingField { row: 0, field: "chunk_index" })?;
    let source_col = find_column(&headers, &["en", "source"])
        .ok_or(ParseError::MissingField { row: 0, field: "en" })?;
    let translation_col = find_column(&headers, &["ko", "translation"])
        .ok_or(ParseError::MissingField { row: 0, field: "ko" })?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;

        // Blank lines inside the file
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let field = |col: usize, name: &'static str| {
            record.get(col).ok_or(ParseError::MissingField { row, field: name })
        };

        let raw_sentence = field(sentence_col, "sentence_id")?;
        if raw_sentence.trim().is_empty() {
            return Err(ParseError::MissingField { row, field: "sentence_id" });
        }
        let sentence_id = coerce_id(raw_sentence).ok_or_else(|| ParseError::InvalidSentenceId {
            row,
            value: raw_sentence.to_string(),
        })?;

        let raw_chunk = field(chunk_col, "chunk_index")?;
        if raw_chunk.trim().is_empty() {
            return Err(ParseError::MissingField { row, field: "chunk_index" });
        }
        let chunk_index = coerce_id(raw_chunk).ok_or_else(|| ParseError::InvalidChunkIndex {
            row,
            value: raw_chunk.to_string(),
        })?;

        rows.push(ChunkRow {
            sentence_id,
            chunk_index,
            source: field(source_col, "en")?.to_string(),
            translation: field(translation_col, "ko")?.to_string(),
        });
    }

    Ok(rows)
}

/// In-memory repository, listing passages in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    entries: Vec<IndexEntry>,
    passages: HashMap<String, Passage>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, passage: Passage) {
        if !self.passages.contains_key(passage.id()) {
            self.entries.push(passage.index_entry());
        }
        self.passages.insert(passage.id().to_string(), passage);
    }
}

impl PassageRepository for MemoryRepository {
    async fn list_passages(&self) -> Result<Vec<IndexEntry>, RepositoryError> {
        Ok(self.entries.clone())
    }

    async fn get_passage(&self, id: &str) -> Result<Passage, RepositoryError> {
        self.passages
            .get(id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound { id: id.to_string() }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::{Chunk, Sentence};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    const INDEX: &str = r#"[
        { "id": "p1", "title": "First Passage" },
        { "id": "p2", "title": "Second Passage" }
    ]"#;

    #[tokio::test]
    async fn test_list_passages_reads_index() {
        let dir = TempDir::new().unwrap();
        write(&dir, INDEX_FILE, INDEX);

        let repo = FsRepository::new(dir.path());
        let entries = repo.list_passages().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].title, "Second Passage");
    }

    #[tokio::test]
    async fn test_list_passages_missing_index_is_load_error() {
        let dir = TempDir::new().unwrap();
        let repo = FsRepository::new(dir.path());
        let err = repo.list_passages().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Load(LoadError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn test_list_passages_malformed_index_is_load_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, INDEX_FILE, "[{ \"id\": 3 }");
        let repo = FsRepository::new(dir.path());
        let err = repo.list_passages().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Load(LoadError::MalformedIndex { .. })));
    }

    #[tokio::test]
    async fn test_get_passage_from_csv_sorts_rows() {
        let dir = TempDir::new().unwrap();
        write(&dir, INDEX_FILE, INDEX);
        write(
            &dir,
            "p1.csv",
            "sentence_id,chunk_index,en,ko\n\
             2,1,is blue.,파랗다.\n\
             1,1,rose.,떴다.\n\
             1,0,The sun,해가\n\
             2,0,The sky,하늘이\n",
        );

        let repo = FsRepository::new(dir.path());
        let passage = repo.get_passage("p1").await.unwrap();
        assert_eq!(passage.title(), "First Passage");

        let ids: Vec<_> = passage.sentences().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(passage.sentences()[0].plain_text(), "The sun rose.");
        assert_eq!(passage.sentences()[1].chunks()[0].translation, "하늘이");
    }

    #[tokio::test]
    async fn test_get_passage_csv_without_index_uses_id_as_title() {
        let dir = TempDir::new().unwrap();
        write(&dir, "solo.csv", "sentence_id,chunk_index,source,translation\n1,0,Hi,안녕\n");
        let repo = FsRepository::new(dir.path());
        let passage = repo.get_passage("solo").await.unwrap();
        assert_eq!(passage.title(), "solo");
    }

    #[tokio::test]
    async fn test_get_passage_prefers_json() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "p2.json",
            r#"{ "passage_id": "p2", "title": "From JSON",
                 "sentences": [{ "sentence_id": 1, "chunks": [{ "en": "a", "ko": "b" }] }] }"#,
        );
        write(&dir, "p2.csv", "sentence_id,chunk_index,en,ko\n1,0,x,y\n");

        let repo = FsRepository::new(dir.path());
        let passage = repo.get_passage("p2").await.unwrap();
        assert_eq!(passage.title(), "From JSON");
    }

    #[tokio::test]
    async fn test_get_passage_not_found() {
        let dir = TempDir::new().unwrap();
        let repo = FsRepository::new(dir.path());
        assert!(repo.get_passage("missing").await.unwrap_err().is_not_found());
        assert!(repo.get_passage("../etc/passwd").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_passage_empty_csv_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "empty.csv", "");
        write(&dir, "header.csv", "sentence_id,chunk_index,en,ko\n");

        let repo = FsRepository::new(dir.path());
        for id in ["empty", "header"] {
            let err = repo.get_passage(id).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Parse(ParseError::NoContent)), "{id}: {err}");
        }
    }

    #[test]
    fn test_parse_csv_rejects_bad_ids() {
        let err = parse_csv_rows("sentence_id,chunk_index,en,ko\nx,0,a,b\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSentenceId { row: 1, .. }));

        let err = parse_csv_rows("sentence_id,chunk_index,en,ko\n1,0,a,b\n1,one,c,d\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidChunkIndex { row: 2, .. }));

        let err = parse_csv_rows("sentence_id,en,ko\n1,a,b\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { row: 0, field: "chunk_index" }));

        let err = parse_csv_rows("sentence_id,chunk_index,en,ko\n1,0\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { row: 1, field: "en" }));
    }

    #[test]
    fn test_parse_csv_coerces_ids_and_skips_blank_lines() {
        let rows = parse_csv_rows("sentence_id,chunk_index,en,ko\n 3 ,1.0,a,b\n,,,\n3,0,c,d\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sentence_id, 3);
        assert_eq!(rows[0].chunk_index, 1);
    }

    #[tokio::test]
    async fn test_memory_repository() {
        let mut repo = MemoryRepository::new();
        let passage = Passage::new("m", "Memory", vec![Sentence::new(1, vec![Chunk::new("a", "b")])]).unwrap();
        repo.insert(passage.clone());
        repo.insert(passage.clone());

        assert_eq!(repo.list_passages().await.unwrap().len(), 1);
        assert_eq!(repo.get_passage("m").await.unwrap(), passage);
        assert!(repo.get_passage("x").await.unwrap_err().is_not_found());
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::passage::{Passage, Sentence};
use crate::selection::SelectionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    /// Sentence by sentence, one chunk at a time, translation on demand.
    Chunk,
    /// The whole passage as plain text, with sentence tagging.
    Full,
}

impl ReadingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingMode::Chunk => "chunk",
            ReadingMode::Full => "full",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReadingMode::Chunk => "Chunk reading",
            ReadingMode::Full => "Full passage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReadingMode::Chunk => "Reveal each sentence one chunk at a time",
            ReadingMode::Full => "See the whole passage at once",
        }
    }

    pub fn all() -> [ReadingMode; 2] {
        [ReadingMode::Chunk, ReadingMode::Full]
    }
}

impl fmt::Display for ReadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chunk" => Ok(ReadingMode::Chunk),
            "full" => Ok(ReadingMode::Full),
            other => Err(format!("unknown reading mode '{}' (expected chunk or full)", other)),
        }
    }
}

/// Which of the two chunk-mode entry rules is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    /// When set, chunk mode can only be entered with a non-empty selection.
    /// When clear, chunk mode walks the whole passage if nothing is selected.
    pub chunk_requires_selection: bool,
}

impl Default for ModePolicy {
    fn default() -> Self {
        Self {
            chunk_requires_selection: true,
        }
    }
}

impl ModePolicy {
    pub fn can_enter(&self, mode: ReadingMode, selection: &SelectionSet) -> bool {
        match mode {
            ReadingMode::Full => true,
            ReadingMode::Chunk => !self.chunk_requires_selection || !selection.is_empty(),
        }
    }
}

/// The sentences a reading session walks through, in passage order.
///
/// Chunk mode narrows to the selection; an empty selection falls back to
/// the whole passage.
pub fn active_sentences(passage: &Passage, mode: ReadingMode, selection: &SelectionSet) -> Vec<Sentence> {
    match mode {
        ReadingMode::Chunk if !selection.is_empty() => passage
            .sentences()
            .iter()
            .filter(|s| selection.is_selected(s.id()))
            .cloned()
            .collect(),
        _ => passage.sentences().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::Chunk;

    fn passage(ids: &[i64]) -> Passage {
        let sentences = ids
            .iter()
            .map(|&i| Sentence::new(i, vec![Chunk::new(format!("s{}", i), "")]))
            .collect();
        Passage::new("p", "Title", sentences).unwrap()
    }

    #[test]
    fn test_chunk_mode_filters_in_passage_order() {
        let p = passage(&[1, 3, 5, 7, 9]);
        let mut selection = SelectionSet::for_passage(&p);
        selection.toggle(7);
        selection.toggle(3);

        let active = active_sentences(&p, ReadingMode::Chunk, &selection);
        let ids: Vec<_> = active.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_full_mode_ignores_selection() {
        let p = passage(&[1, 3, 5]);
        let mut selection = SelectionSet::for_passage(&p);
        selection.toggle(3);
        assert_eq!(active_sentences(&p, ReadingMode::Full, &selection).len(), 3);
    }

    #[test]
    fn test_chunk_mode_empty_selection_falls_back_to_everything() {
        let p = passage(&[1, 3, 5]);
        let selection = SelectionSet::for_passage(&p);
        assert_eq!(active_sentences(&p, ReadingMode::Chunk, &selection).len(), 3);
    }

    #[test]
    fn test_policy_gates_chunk_entry() {
        let p = passage(&[1, 2]);
        let mut selection = SelectionSet::for_passage(&p);
        let strict = ModePolicy::default();
        let lenient = ModePolicy {
            chunk_requires_selection: false,
        };

        assert!(strict.can_enter(ReadingMode::Full, &selection));
        assert!(!strict.can_enter(ReadingMode::Chunk, &selection));
        assert!(lenient.can_enter(ReadingMode::Chunk, &selection));

        selection.toggle(2);
        assert!(strict.can_enter(ReadingMode::Chunk, &selection));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Chunk".parse::<ReadingMode>(), Ok(ReadingMode::Chunk));
        assert_eq!(" full ".parse::<ReadingMode>(), Ok(ReadingMode::Full));
        assert!("fast".parse::<ReadingMode>().is_err());
    }
}

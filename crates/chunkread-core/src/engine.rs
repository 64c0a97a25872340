//! Reading progress: where the reader is inside the active sentence list.
//!
//! [`ReadingCursor`] is a plain value and [`ReadingCursor::apply`] a pure
//! transition over it, so every no-op and terminal case can be checked
//! without any surrounding state. [`ReadingEngine`] owns a cursor together
//! with the sentences it walks.

use crate::mode::ReadingMode;
use crate::passage::{Chunk, Sentence};

/// What is visible of the current sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// Nothing revealed yet.
    Hidden,
    /// Chunks `0..=index` are visible; `translated` shows the translation
    /// of chunk `index`, the only chunk that can carry one.
    Chunk { index: usize, translated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingCursor {
    sentence: usize,
    reveal: Reveal,
    reached_end: bool,
}

/// A user intent the cursor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Advance,
    Retreat,
    RevealTranslation,
    Restart,
    AcknowledgeEnd,
}

impl Default for ReadingCursor {
    fn default() -> Self {
        Self::START
    }
}

impl ReadingCursor {
    pub const START: ReadingCursor = ReadingCursor {
        sentence: 0,
        reveal: Reveal::Hidden,
        reached_end: false,
    };

    pub fn sentence_position(&self) -> usize {
        self.sentence
    }

    /// Index of the last revealed chunk, `None` before the first reveal.
    pub fn chunk_position(&self) -> Option<usize> {
        match self.reveal {
            Reveal::Hidden => None,
            Reveal::Chunk { index, .. } => Some(index),
        }
    }

    pub fn reveal(&self) -> Reveal {
        self.reveal
    }

    pub fn translation_revealed_at(&self) -> Option<usize> {
        match self.reveal {
            Reveal::Chunk { index, translated: true } => Some(index),
            _ => None,
        }
    }

    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    pub fn can_retreat(&self) -> bool {
        match self.reveal {
            Reveal::Hidden => false,
            Reveal::Chunk { index, .. } => index > 0 || self.sentence > 0,
        }
    }

    fn at(sentence: usize, index: usize) -> Self {
        Self {
            sentence,
            reveal: Reveal::Chunk {
                index,
                translated: false,
            },
            reached_end: false,
        }
    }

    /// Apply `intent` over `sentences`, returning the next cursor.
    ///
    /// Total over every input: an empty list or a cursor that no longer
    /// fits the list yields [`ReadingCursor::START`], and intents that do
    /// not apply return the cursor unchanged.
    pub fn apply(self, intent: Intent, sentences: &[Sentence], mode: ReadingMode) -> Self {
        let Some(current) = sentences.get(self.sentence) else {
            return Self::START;
        };
        let last_chunk = current.last_chunk_index();
        if matches!(self.reveal, Reveal::Chunk { index, .. } if index > last_chunk) {
            return Self::START;
        }

        match intent {
            Intent::Advance => match self.reveal {
                Reveal::Hidden => Self::at(self.sentence, 0),
                Reveal::Chunk { index, .. } if index < last_chunk => Self::at(self.sentence, index + 1),
                Reveal::Chunk { .. } if self.sentence + 1 < sentences.len() => Self::at(self.sentence + 1, 0),
                Reveal::Chunk { .. } => Self {
                    reached_end: true,
                    ..self
                },
            },
            Intent::Retreat => match self.reveal {
                Reveal::Chunk { index, .. } if index > 0 => Self::at(self.sentence, index - 1),
                Reveal::Chunk { .. } if self.sentence > 0 => {
                    let previous = &sentences[self.sentence - 1];
                    Self::at(self.sentence - 1, previous.last_chunk_index())
                }
                _ => self,
            },
            Intent::RevealTranslation => match (mode, self.reveal) {
                (ReadingMode::Chunk, Reveal::Chunk { index, .. }) => Self {
                    reveal: Reveal::Chunk {
                        index,
                        translated: true,
                    },
                    ..self
                },
                _ => self,
            },
            Intent::Restart => Self::START,
            Intent::AcknowledgeEnd => Self {
                reached_end: false,
                ..self
            },
        }
    }
}

/// Cursor plus the active sentence list it walks.
#[derive(Debug, Clone)]
pub struct ReadingEngine {
    mode: ReadingMode,
    sentences: Vec<Sentence>,
    cursor: ReadingCursor,
}

impl ReadingEngine {
    pub fn new(mode: ReadingMode, sentences: Vec<Sentence>) -> Self {
        Self {
            mode,
            sentences,
            cursor: ReadingCursor::START,
        }
    }

    /// Replace the active list and move to the start.
    pub fn initialize(&mut self, sentences: Vec<Sentence>) {
        self.sentences = sentences;
        self.cursor = ReadingCursor::START;
    }

    /// Apply an intent. Returns whether the cursor changed.
    pub fn apply(&mut self, intent: Intent) -> bool {
        if self.sentences.is_empty() {
            return false;
        }
        let next = self.cursor.apply(intent, &self.sentences, self.mode);
        let changed = next != self.cursor;
        self.cursor = next;
        changed
    }

    pub fn advance(&mut self) -> bool {
        self.apply(Intent::Advance)
    }

    pub fn retreat(&mut self) -> bool {
        self.apply(Intent::Retreat)
    }

    pub fn reveal_translation(&mut self) -> bool {
        self.apply(Intent::RevealTranslation)
    }

    pub fn restart(&mut self) -> bool {
        self.apply(Intent::Restart)
    }

    pub fn acknowledge_end(&mut self) -> bool {
        self.apply(Intent::AcknowledgeEnd)
    }

    /// Swap in a new active list, keeping the sentence position when it
    /// still fits.
    ///
    /// An out-of-range position reinitializes. Otherwise the chunk position
    /// is clamped to the new sentence's chunk count and the end signal is
    /// dropped; a translation stays visible only if its chunk did not move.
    pub fn change_active_sentences(&mut self, sentences: Vec<Sentence>) {
        let position = self.cursor.sentence;
        let Some(last_chunk) = sentences.get(position).map(Sentence::last_chunk_index) else {
            self.initialize(sentences);
            return;
        };

        let reveal = match self.cursor.reveal {
            Reveal::Hidden => Reveal::Hidden,
            Reveal::Chunk { index, translated } if index <= last_chunk => Reveal::Chunk { index, translated },
            Reveal::Chunk { .. } => Reveal::Chunk {
                index: last_chunk,
                translated: false,
            },
        };

        self.sentences = sentences;
        self.cursor = ReadingCursor {
            sentence: position,
            reveal,
            reached_end: false,
        };
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn cursor(&self) -> &ReadingCursor {
        &self.cursor
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn current_sentence(&self) -> Option<&Sentence> {
        self.sentences.get(self.cursor.sentence)
    }

    pub fn current_chunk(&self) -> Option<&Chunk> {
        let index = self.cursor.chunk_position()?;
        self.current_sentence()?.chunks().get(index)
    }

    /// Chunks of the current sentence that are visible, in order.
    pub fn revealed_chunks(&self) -> &[Chunk] {
        match (self.current_sentence(), self.cursor.chunk_position()) {
            (Some(sentence), Some(index)) => {
                let chunks = sentence.chunks();
                &chunks[..(index + 1).min(chunks.len())]
            }
            _ => &[],
        }
    }

    pub fn is_translation_visible_for_current_chunk(&self) -> bool {
        self.cursor.translation_revealed_at().is_some()
            && self.cursor.translation_revealed_at() == self.cursor.chunk_position()
    }

    pub fn reached_end(&self) -> bool {
        self.cursor.reached_end
    }

    /// Advancing is always possible on a non-empty list; past the last
    /// chunk it raises the end signal.
    pub fn can_advance(&self) -> bool {
        !self.sentences.is_empty()
    }

    pub fn can_retreat(&self) -> bool {
        !self.sentences.is_empty() && self.cursor.can_retreat()
    }

    pub fn progress_label(&self) -> String {
        if self.sentences.is_empty() {
            return "No sentences".to_string();
        }
        format!("Sentence {} / {}", self.cursor.sentence + 1, self.sentences.len())
    }
}

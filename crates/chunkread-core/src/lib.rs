pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mode;
pub mod passage;
pub mod repository;
pub mod selection;
pub mod session;

// Re-export main types for convenience
pub use config::{Config, Theme};
pub use engine::{Intent, ReadingCursor, ReadingEngine, Reveal};
pub use error::{LoadError, ParseError, RepositoryError};
pub use mode::{active_sentences, ModePolicy, ReadingMode};
pub use passage::{Chunk, ChunkRow, IndexEntry, Passage, Sentence, SentenceId};
pub use repository::{FsRepository, MemoryRepository, PassageRepository};
pub use selection::SelectionSet;
pub use session::{LoadState, LoadTicket, ReadingSession};

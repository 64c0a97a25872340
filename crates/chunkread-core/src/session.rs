//! The reading session: everything one reader has open at a time.
//!
//! The session owns the loaded passage, the selection set, the active mode
//! and the engine. Views read from it and forward intents into it. Passage
//! loads are split into [`ReadingSession::begin_load`] and
//! [`ReadingSession::finish_load`] so the fetch itself can run elsewhere;
//! each load carries a generation number and only the newest one is
//! allowed to land.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::{Intent, ReadingEngine};
use crate::error::RepositoryError;
use crate::mode::{active_sentences, ModePolicy, ReadingMode};
use crate::passage::{Passage, SentenceId};
use crate::selection::SelectionSet;

/// Handle for one in-flight passage load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    passage_id: String,
}

impl LoadTicket {
    pub fn passage_id(&self) -> &str {
        &self.passage_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { passage_id: String },
    Ready,
    Failed { message: String },
}

#[derive(Debug)]
pub struct ReadingSession {
    policy: ModePolicy,
    generation: u64,
    load_state: LoadState,
    passage: Option<Arc<Passage>>,
    selection: SelectionSet,
    mode: Option<ReadingMode>,
    engine: Option<ReadingEngine>,
}

impl ReadingSession {
    pub fn new(policy: ModePolicy) -> Self {
        Self {
            policy,
            generation: 0,
            load_state: LoadState::Idle,
            passage: None,
            selection: SelectionSet::new(),
            mode: None,
            engine: None,
        }
    }

    // Loading

    /// Start loading `passage_id`, superseding any load still in flight.
    ///
    /// The current passage and engine are dropped until the load finishes.
    /// A requested mode set beforehand with [`ReadingSession::request_mode`]
    /// is kept and applied when the passage arrives.
    pub fn begin_load(&mut self, passage_id: &str) -> LoadTicket {
        self.generation += 1;
        self.passage = None;
        self.engine = None;
        if self.selection.passage_id().is_some_and(|id| id != passage_id) {
            self.selection.reset();
        }
        self.load_state = LoadState::Loading {
            passage_id: passage_id.to_string(),
        };
        debug!(passage_id, generation = self.generation, "Passage load started");

        LoadTicket {
            generation: self.generation,
            passage_id: passage_id.to_string(),
        }
    }

    /// Land the result of a load. Returns `false` when the ticket was
    /// superseded, in which case nothing changes.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<Passage, RepositoryError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                passage_id = %ticket.passage_id,
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale passage load"
            );
            return false;
        }

        match result {
            Ok(passage) => {
                info!(
                    passage_id = passage.id(),
                    sentences = passage.sentences().len(),
                    "Passage loaded"
                );
                self.selection.rescope_as(ticket.passage_id(), &passage);
                self.passage = Some(Arc::new(passage));
                self.load_state = LoadState::Ready;
                if let Some(mode) = self.mode.take() {
                    if !self.enter_mode(mode) {
                        warn!(mode = %mode, "Requested mode not available for this passage");
                    }
                }
            }
            Err(e) => {
                warn!(passage_id = %ticket.passage_id, error = %e, "Passage load failed");
                self.passage = None;
                self.engine = None;
                self.load_state = LoadState::Failed { message: e.to_string() };
            }
        }
        true
    }

    /// Abandon the current passage (and any load in flight).
    pub fn close_passage(&mut self) {
        self.generation += 1;
        self.passage = None;
        self.engine = None;
        self.mode = None;
        self.load_state = LoadState::Idle;
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load_state, LoadState::Loading { .. })
    }

    pub fn passage(&self) -> Option<&Passage> {
        self.passage.as_deref()
    }

    // Modes

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    pub fn mode(&self) -> Option<ReadingMode> {
        self.mode
    }

    pub fn can_enter(&self, mode: ReadingMode) -> bool {
        self.passage.is_some() && self.policy.can_enter(mode, &self.selection)
    }

    /// Remember a mode to enter once the next load finishes.
    pub fn request_mode(&mut self, mode: ReadingMode) {
        if self.passage.is_some() {
            self.enter_mode(mode);
        } else {
            self.mode = Some(mode);
        }
    }

    /// Enter `mode` with a freshly initialized cursor.
    ///
    /// Returns `false` when no passage is loaded or the policy refuses
    /// chunk mode for the current selection.
    pub fn enter_mode(&mut self, mode: ReadingMode) -> bool {
        let Some(passage) = self.passage.clone() else {
            return false;
        };
        if !self.policy.can_enter(mode, &self.selection) {
            info!(mode = %mode, "Mode entry refused by policy");
            return false;
        }

        let sentences = active_sentences(&passage, mode, &self.selection);
        info!(mode = %mode, sentences = sentences.len(), "Entering mode");
        match self.engine.as_mut() {
            Some(engine) if engine.mode() == mode => engine.initialize(sentences),
            _ => self.engine = Some(ReadingEngine::new(mode, sentences)),
        }
        self.mode = Some(mode);
        true
    }

    /// Back to mode selection. The selection is kept.
    pub fn leave_mode(&mut self) {
        self.mode = None;
        self.engine = None;
    }

    pub fn engine(&self) -> Option<&ReadingEngine> {
        self.engine.as_ref()
    }

    /// Forward an intent to the engine. No-op while nothing is loaded.
    pub fn apply(&mut self, intent: Intent) -> bool {
        match self.engine.as_mut() {
            Some(engine) => engine.apply(intent),
            None => false,
        }
    }

    /// End-of-content "switch to full view": clear the end signal, then
    /// enter full mode.
    pub fn finish_with_full_view(&mut self) -> bool {
        self.apply(Intent::AcknowledgeEnd);
        self.enter_mode(ReadingMode::Full)
    }

    // Selection

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Toggle a sentence. Only available in full mode.
    pub fn toggle_sentence(&mut self, id: SentenceId) -> bool {
        if self.mode != Some(ReadingMode::Full) {
            debug!(id, "Selection toggle ignored outside full mode");
            return false;
        }
        let changed = self.selection.toggle(id);
        if changed {
            debug!(id, selected = self.selection.is_selected(id), "Sentence toggled");
        }
        changed
    }

    /// Clear the selection. Not available while chunk reading.
    pub fn clear_selection(&mut self) -> bool {
        if self.mode == Some(ReadingMode::Chunk) {
            return false;
        }
        self.selection.clear()
    }

    // Presentation

    pub fn title(&self) -> &str {
        match (&self.passage, &self.load_state) {
            (Some(passage), _) => passage.title(),
            (None, LoadState::Loading { .. }) => "Loading...",
            (None, LoadState::Failed { .. }) => "Data Load Error",
            (None, _) => "",
        }
    }

    /// Sub-header: progress in chunk mode, selection summary in full mode.
    pub fn subtitle(&self) -> String {
        match (&self.load_state, self.mode, &self.engine) {
            (LoadState::Failed { message }, _, _) => message.clone(),
            (_, Some(ReadingMode::Chunk), Some(engine)) => engine.progress_label(),
            (_, Some(ReadingMode::Full), _) if self.selection.is_empty() => "Full passage".to_string(),
            (_, Some(ReadingMode::Full), _) => {
                format!("Full passage · {} selected", self.selection.len())
            }
            _ => String::new(),
        }
    }
}

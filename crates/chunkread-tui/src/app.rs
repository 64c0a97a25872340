use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{info, warn};

use chunkread_core::{
    Config, IndexEntry, Intent, LoadTicket, Passage, ReadingMode, ReadingSession, RepositoryError,
    Theme,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    ModeSelect,
    Reader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    Loading,
    Ready,
    Failed(String),
}

/// Background work the event loop should start on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Index,
    Passage(LoadTicket),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub status: Option<String>,

    // Passage list
    pub index: Vec<IndexEntry>,
    pub index_state: IndexState,
    pub list_state: ListState,

    // Mode select
    pub mode_state: ListState,

    // Reading
    pub session: ReadingSession,
    pub focused_sentence: usize,
    pub full_scroll: u16,
    pub full_height: u16,
    /// Focus the scroll offset was last brought in line with
    pub full_scroll_focus: Option<usize>,
    /// Passage line -> sentence index, rebuilt on every full-view render
    pub full_line_map: Vec<usize>,

    // Theme picker
    pub theme: Theme,
    pub show_theme_picker: bool,
    pub theme_picker_state: ListState,

    // Panel areas for mouse hit-testing (updated during render)
    pub content_area: Option<Rect>,

    requests: Vec<LoadRequest>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut mode_state = ListState::default();
        mode_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::List,
            status: None,

            index: Vec::new(),
            index_state: IndexState::Loading,
            list_state: ListState::default(),

            mode_state,

            session: ReadingSession::new(config.mode_policy()),
            focused_sentence: 0,
            full_scroll: 0,
            full_height: 0,
            full_scroll_focus: None,
            full_line_map: Vec::new(),

            theme: config.theme.unwrap_or_default(),
            show_theme_picker: false,
            theme_picker_state: ListState::default(),

            content_area: None,

            requests: Vec::new(),
        }
    }

    /// Hand queued loads to the event loop.
    pub fn drain_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.requests)
    }

    // Passage list

    pub fn request_index(&mut self) {
        self.index_state = IndexState::Loading;
        self.requests.push(LoadRequest::Index);
    }

    pub fn on_index_loaded(&mut self, result: Result<Vec<IndexEntry>, RepositoryError>) {
        match result {
            Ok(entries) => {
                info!(count = entries.len(), "Passage index ready");
                self.index = entries;
                self.index_state = IndexState::Ready;
                self.list_state.select(if self.index.is_empty() { None } else { Some(0) });
            }
            Err(e) => {
                warn!(error = %e, "Passage index failed to load");
                self.index.clear();
                self.index_state = IndexState::Failed(e.to_string());
                self.list_state.select(None);
            }
        }
    }

    pub fn list_down(&mut self) {
        let len = self.index.len();
        if len > 0 {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn list_up(&mut self) {
        if !self.index.is_empty() {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn list_first(&mut self) {
        if !self.index.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn list_last(&mut self) {
        if !self.index.is_empty() {
            self.list_state.select(Some(self.index.len() - 1));
        }
    }

    pub fn selected_entry(&self) -> Option<&IndexEntry> {
        self.list_state.selected().and_then(|i| self.index.get(i))
    }

    /// Title from the index, used while the passage itself is in flight.
    pub fn entry_title(&self, id: &str) -> Option<&str> {
        self.index.iter().find(|e| e.id == id).map(|e| e.title.as_str())
    }

    /// Pick a passage and move to mode selection while it loads.
    pub fn open_passage(&mut self, id: &str) {
        let ticket = self.session.begin_load(id);
        self.requests.push(LoadRequest::Passage(ticket));
        self.screen = if self.session.mode().is_some() {
            Screen::Reader
        } else {
            Screen::ModeSelect
        };
        self.status = None;
    }

    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
            self.session.leave_mode();
            self.open_passage(&id);
        }
    }

    pub fn on_passage_loaded(&mut self, ticket: LoadTicket, result: Result<Passage, RepositoryError>) {
        if !self.session.finish_load(&ticket, result) {
            return;
        }
        self.reset_reader_view();
        self.screen = match self.session.mode() {
            Some(_) => Screen::Reader,
            None if self.screen == Screen::Reader => Screen::ModeSelect,
            None => self.screen,
        };
    }

    pub fn back_to_list(&mut self) {
        self.session.close_passage();
        self.screen = Screen::List;
        self.status = None;
    }

    // Mode select

    pub fn highlighted_mode(&self) -> ReadingMode {
        let modes = ReadingMode::all();
        let i = self.mode_state.selected().unwrap_or(0).min(modes.len() - 1);
        modes[i]
    }

    pub fn mode_down(&mut self) {
        let i = self.mode_state.selected().unwrap_or(0);
        self.mode_state.select(Some((i + 1).min(ReadingMode::all().len() - 1)));
    }

    pub fn mode_up(&mut self) {
        let i = self.mode_state.selected().unwrap_or(0);
        self.mode_state.select(Some(i.saturating_sub(1)));
    }

    /// Enter a reading mode, reporting why when it is refused.
    pub fn enter_mode(&mut self, mode: ReadingMode) {
        if self.session.passage().is_none() {
            return;
        }
        if self.session.enter_mode(mode) {
            self.reset_reader_view();
            self.screen = Screen::Reader;
            self.status = None;
        } else {
            self.status = Some("Select at least one sentence in full view to read in chunks".to_string());
        }
    }

    pub fn back_to_mode_select(&mut self) {
        self.session.leave_mode();
        self.screen = Screen::ModeSelect;
        self.status = None;
    }

    // Reader

    pub fn apply(&mut self, intent: Intent) {
        self.session.apply(intent);
    }

    pub fn restart(&mut self) {
        self.session.apply(Intent::Restart);
    }

    pub fn finish_with_full_view(&mut self) {
        if self.session.finish_with_full_view() {
            self.reset_reader_view();
        }
    }

    pub fn reached_end(&self) -> bool {
        self.session.engine().is_some_and(|e| e.reached_end())
    }

    fn reset_reader_view(&mut self) {
        self.focused_sentence = 0;
        self.full_scroll = 0;
        self.full_scroll_focus = None;
    }

    fn sentence_count(&self) -> usize {
        self.session.engine().map_or(0, |e| e.sentences().len())
    }

    pub fn focus_next_sentence(&mut self) {
        let len = self.sentence_count();
        if len > 0 {
            self.focused_sentence = (self.focused_sentence + 1).min(len - 1);
        }
    }

    pub fn focus_prev_sentence(&mut self) {
        self.focused_sentence = self.focused_sentence.saturating_sub(1);
    }

    /// Toggle the focused sentence in full view.
    pub fn toggle_focused(&mut self) {
        self.toggle_at(self.focused_sentence);
    }

    pub fn toggle_at(&mut self, index: usize) {
        let id = self
            .session
            .engine()
            .and_then(|e| e.sentences().get(index))
            .map(|s| s.id());
        if let Some(id) = id {
            self.focused_sentence = index;
            self.session.toggle_sentence(id);
            self.status = None;
        }
    }

    pub fn clear_selection(&mut self) {
        if self.session.clear_selection() {
            self.status = Some("Selection cleared".to_string());
        }
    }

    pub fn scroll_down(&mut self) {
        let max = (self.full_line_map.len() as u16).saturating_sub(self.full_height);
        self.full_scroll = (self.full_scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.full_scroll = self.full_scroll.saturating_sub(1);
    }

    /// Sentence under a terminal row in the full view, if any.
    pub fn sentence_at_row(&self, row: u16) -> Option<usize> {
        let area = self.content_area?;
        if row < area.y || row >= area.y + area.height {
            return None;
        }
        let line = (row - area.y) as usize + self.full_scroll as usize;
        self.full_line_map.get(line).copied()
    }

    // Theme picker

    pub fn open_theme_picker(&mut self) {
        let current = Theme::all().iter().position(|t| *t == self.theme).unwrap_or(0);
        self.theme_picker_state.select(Some(current));
        self.show_theme_picker = true;
    }

    pub fn theme_picker_down(&mut self) {
        let len = Theme::all().len();
        let i = self.theme_picker_state.selected().unwrap_or(0);
        self.theme_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn theme_picker_up(&mut self) {
        let i = self.theme_picker_state.selected().unwrap_or(0);
        self.theme_picker_state.select(Some(i.saturating_sub(1)));
    }

    /// Apply the highlighted theme and persist it.
    pub fn confirm_theme(&mut self) {
        if let Some(theme) = self
            .theme_picker_state
            .selected()
            .and_then(|i| Theme::all().get(i).copied())
        {
            self.theme = theme;
            if let Err(e) = Config::save_theme(theme) {
                warn!(error = %e, "Failed to save theme");
            }
        }
        self.show_theme_picker = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkread_core::{Chunk, LoadError, Sentence};

    fn passage(id: &str) -> Passage {
        Passage::new(
            id,
            "Spring",
            vec![
                Sentence::new(1, vec![Chunk::new("The snow", "눈이"), Chunk::new("melted.", "녹았다.")]),
                Sentence::new(2, vec![Chunk::new("Birds sang.", "새들이 노래했다.")]),
            ],
        )
        .unwrap()
    }

    fn app_with_index() -> App {
        let mut app = App::new(&Config::new());
        app.request_index();
        assert_eq!(app.drain_requests(), vec![LoadRequest::Index]);
        app.on_index_loaded(Ok(vec![IndexEntry {
            id: "spring".to_string(),
            title: "Spring".to_string(),
        }]));
        app
    }

    fn opened(app: &mut App) {
        app.open_selected();
        let requests = app.drain_requests();
        let Some(LoadRequest::Passage(ticket)) = requests.into_iter().next() else {
            panic!("expected a passage load");
        };
        app.on_passage_loaded(ticket, Ok(passage("spring")));
    }

    #[test]
    fn test_index_failure_is_reported() {
        let mut app = App::new(&Config::new());
        app.on_index_loaded(Err(LoadError::NotFound { id: "index".to_string() }.into()));
        assert!(matches!(app.index_state, IndexState::Failed(_)));
        assert!(app.selected_entry().is_none());
    }

    #[test]
    fn test_open_passage_goes_to_mode_select() {
        let mut app = app_with_index();
        opened(&mut app);
        assert_eq!(app.screen, Screen::ModeSelect);
        assert_eq!(app.session.passage().map(|p| p.title()), Some("Spring"));
    }

    #[test]
    fn test_chunk_mode_refused_without_selection() {
        let mut app = app_with_index();
        opened(&mut app);
        app.enter_mode(ReadingMode::Chunk);
        assert_eq!(app.screen, Screen::ModeSelect);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_select_in_full_view_then_read_chunks() {
        let mut app = app_with_index();
        opened(&mut app);
        app.enter_mode(ReadingMode::Full);
        app.focus_next_sentence();
        app.toggle_focused();
        assert!(app.session.selection().is_selected(2));

        app.enter_mode(ReadingMode::Chunk);
        assert_eq!(app.screen, Screen::Reader);
        app.apply(Intent::Advance);
        app.apply(Intent::Advance);
        assert!(app.reached_end());

        app.finish_with_full_view();
        assert_eq!(app.session.mode(), Some(ReadingMode::Full));
        assert!(!app.reached_end());
    }

    #[test]
    fn test_back_to_list_discards_inflight_load() {
        let mut app = app_with_index();
        app.open_selected();
        let requests = app.drain_requests();
        app.back_to_list();

        if let Some(LoadRequest::Passage(ticket)) = requests.into_iter().next() {
            app.on_passage_loaded(ticket, Ok(passage("spring")));
        }
        assert_eq!(app.screen, Screen::List);
        assert!(app.session.passage().is_none());
    }

    #[test]
    fn test_sentence_at_row_uses_scroll() {
        let mut app = App::new(&Config::new());
        app.content_area = Some(Rect::new(0, 5, 40, 3));
        app.full_line_map = vec![0, 0, 1, 2, 2];
        assert_eq!(app.sentence_at_row(5), Some(0));
        assert_eq!(app.sentence_at_row(7), Some(1));
        assert_eq!(app.sentence_at_row(8), None);

        app.full_scroll = 2;
        assert_eq!(app.sentence_at_row(6), Some(2));
    }
}

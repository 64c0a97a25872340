use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use chunkread_core::{Intent, ReadingMode};

use crate::app::{App, IndexState, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::IndexLoaded(result) => app.on_index_loaded(result),
        AppEvent::PassageLoaded { ticket, result } => app.on_passage_loaded(ticket, result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on any screen
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_theme_picker {
        handle_theme_picker(app, key);
        return;
    }
    if key.code == KeyCode::Char('T') {
        app.open_theme_picker();
        return;
    }

    match app.screen {
        Screen::List => handle_list(app, key),
        Screen::ModeSelect => handle_mode_select(app, key),
        Screen::Reader => handle_reader(app, key),
    }
}

fn handle_theme_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.theme_picker_down(),
        KeyCode::Char('k') | KeyCode::Up => app.theme_picker_up(),
        KeyCode::Enter => app.confirm_theme(),
        KeyCode::Esc | KeyCode::Char('T') => app.show_theme_picker = false,
        _ => {}
    }
}

fn handle_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.list_down(),
        KeyCode::Char('k') | KeyCode::Up => app.list_up(),
        KeyCode::Char('g') => app.list_first(),
        KeyCode::Char('G') => app.list_last(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected(),
        KeyCode::Char('r') if matches!(app.index_state, IndexState::Failed(_)) => app.request_index(),
        _ => {}
    }
}

fn handle_mode_select(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => app.back_to_list(),
        KeyCode::Char('j') | KeyCode::Down => app.mode_down(),
        KeyCode::Char('k') | KeyCode::Up => app.mode_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            let mode = app.highlighted_mode();
            app.enter_mode(mode);
        }
        KeyCode::Char('c') => app.clear_selection(),
        KeyCode::Char('f') => app.enter_mode(ReadingMode::Full),
        KeyCode::Char('m') => app.enter_mode(ReadingMode::Chunk),
        _ => {}
    }
}

fn handle_reader(app: &mut App, key: KeyEvent) {
    if app.session.engine().is_none() {
        // Still loading, or the load failed
        if matches!(key.code, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q')) {
            app.back_to_mode_select();
        }
        return;
    }

    if app.reached_end() {
        handle_end_popup(app, key);
        return;
    }

    match app.session.mode() {
        Some(ReadingMode::Chunk) => handle_chunk_reader(app, key),
        Some(ReadingMode::Full) => handle_full_reader(app, key),
        None => {}
    }
}

fn handle_end_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('g') => app.restart(),
        KeyCode::Char('f') => app.finish_with_full_view(),
        KeyCode::Esc => app.apply(Intent::AcknowledgeEnd),
        _ => {}
    }
}

fn handle_chunk_reader(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            app.apply(Intent::Advance)
        }
        KeyCode::Char('h') | KeyCode::Left => app.apply(Intent::Retreat),
        KeyCode::Char('t') => app.apply(Intent::RevealTranslation),
        KeyCode::Char('g') => app.restart(),
        KeyCode::Char('f') => app.enter_mode(ReadingMode::Full),
        KeyCode::Esc | KeyCode::Backspace => app.back_to_mode_select(),
        _ => {}
    }
}

fn handle_full_reader(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.focus_next_sentence(),
        KeyCode::Char('k') | KeyCode::Up => app.focus_prev_sentence(),
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => app.toggle_focused(),
        KeyCode::Char('c') => app.clear_selection(),
        KeyCode::Char('m') => app.enter_mode(ReadingMode::Chunk),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.full_height / 2 {
                app.scroll_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.full_height / 2 {
                app.scroll_up();
            }
        }
        KeyCode::Esc | KeyCode::Backspace => app.back_to_mode_select(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.show_theme_picker || app.screen != Screen::Reader || app.reached_end() {
        return;
    }

    let inside = app.content_area.is_some_and(|area| {
        mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height
    });

    match (app.session.mode(), mouse.kind) {
        // Tapping the sentence frame reveals the active chunk's translation
        (Some(ReadingMode::Chunk), MouseEventKind::Down(MouseButton::Left)) if inside => {
            app.apply(Intent::RevealTranslation);
        }
        (Some(ReadingMode::Full), MouseEventKind::Down(MouseButton::Left)) if inside => {
            if let Some(index) = app.sentence_at_row(mouse.row) {
                app.toggle_at(index);
            }
        }
        (Some(ReadingMode::Full), MouseEventKind::ScrollDown) => app.scroll_down(),
        (Some(ReadingMode::Full), MouseEventKind::ScrollUp) => app.scroll_up(),
        _ => {}
    }
}

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use chunkread_core::{LoadState, ReadingMode, Theme};
use crate::app::{App, IndexState, Screen};

/// Colors derived from the selected theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub card: Color,
    pub border: Color,
    pub accent: Color,
    pub muted: Color,
    pub tagged: Color,
}

pub fn palette(theme: Theme) -> Palette {
    let (bg, fg, card, border) = match theme {
        Theme::White => (
            Color::Rgb(0xf7, 0xf8, 0xfa),
            Color::Rgb(0x11, 0x11, 0x11),
            Color::Rgb(0xff, 0xff, 0xff),
            Color::Rgb(0xc8, 0xc8, 0xc8),
        ),
        Theme::Black => (
            Color::Rgb(0x0f, 0x11, 0x15),
            Color::Rgb(0xf5, 0xf7, 0xfb),
            Color::Rgb(0x1a, 0x1d, 0x24),
            Color::Rgb(0x55, 0x5a, 0x66),
        ),
        Theme::Pink => (
            Color::Rgb(0xff, 0xe6, 0xf1),
            Color::Rgb(0x35, 0x12, 0x20),
            Color::Rgb(0xff, 0xea, 0xf5),
            Color::Rgb(0xe0, 0xb0, 0xc4),
        ),
        Theme::Sky => (
            Color::Rgb(0xe5, 0xf4, 0xff),
            Color::Rgb(0x15, 0x30, 0x41),
            Color::Rgb(0xe9, 0xf5, 0xff),
            Color::Rgb(0xa8, 0xc8, 0xdf),
        ),
        Theme::Green => (
            Color::Rgb(0xe9, 0xf7, 0xef),
            Color::Rgb(0x12, 0x30, 0x22),
            Color::Rgb(0xe9, 0xf7, 0xef),
            Color::Rgb(0xa8, 0xd0, 0xb8),
        ),
    };

    Palette {
        bg,
        fg,
        card,
        border,
        accent: Color::Rgb(0x2f, 0x6f, 0xeb),
        muted: Color::Rgb(0x88, 0x88, 0x88),
        tagged: Color::Rgb(0xff, 0xf7, 0xc2),
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let colors = palette(app.theme);

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &colors);

    match app.screen {
        Screen::List => render_list_screen(app, frame, body_area, &colors),
        Screen::ModeSelect => render_mode_select(app, frame, body_area, &colors),
        Screen::Reader => render_reader(app, frame, body_area, &colors),
    }

    render_footer(app, frame, footer_area, &colors);

    // Popups
    if app.show_theme_picker {
        render_theme_picker(app, frame, area, &colors);
    } else if app.screen == Screen::Reader && app.reached_end() {
        render_end_popup(frame, area, &colors);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let selected = app.session.selection().len();
    let selection_indicator = if selected > 0 {
        format!(" [{} tagged]", selected)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" chunkread ", Style::default().fg(colors.accent).bold()),
        Span::styled(selection_indicator, Style::default().fg(colors.muted)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(colors.muted),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(colors.card));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let mode_text = match (app.screen, app.session.mode()) {
        (Screen::List, _) => " PASSAGES ",
        (Screen::ModeSelect, _) => " MODE ",
        (Screen::Reader, Some(ReadingMode::Chunk)) => " CHUNK ",
        (Screen::Reader, _) => " FULL ",
    };

    let hints = if app.show_theme_picker {
        "j/k: move  Enter: apply  Esc: close"
    } else {
        match (app.screen, app.session.mode()) {
            (Screen::List, _) => "j/k: move  Enter: open  T: theme  q: quit",
            (Screen::ModeSelect, _) => "j/k: move  Enter: choose  c: clear tags  Esc: back  T: theme",
            (Screen::Reader, Some(ReadingMode::Chunk)) => {
                "Space: next  h: prev  t/click: translation  f: full view  Esc: back"
            }
            (Screen::Reader, _) => "j/k: sentence  Space/click: tag  c: clear  m: chunk mode  Esc: back",
        }
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().bg(colors.accent).fg(Color::White)),
        Span::raw(" "),
        Span::styled(hints, Style::default().fg(colors.muted)),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Red)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn card(title: String, colors: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.card).fg(colors.fg))
        .title(title)
}

fn render_list_screen(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let block = card(" Passages ".to_string(), colors);

    match &app.index_state {
        IndexState::Loading => {
            let text = Paragraph::new("Loading…").style(Style::default().fg(colors.muted)).block(block);
            frame.render_widget(text, area);
        }
        IndexState::Failed(message) => {
            let text = Paragraph::new(vec![
                Line::styled("Could not load passages", Style::default().fg(Color::Red).bold()),
                Line::raw(message.clone()),
                Line::raw(""),
                Line::styled("Press r to retry", Style::default().fg(colors.muted)),
            ])
            .wrap(Wrap { trim: false })
            .block(block);
            frame.render_widget(text, area);
        }
        IndexState::Ready if app.index.is_empty() => {
            let text = Paragraph::new("No passages available.")
                .style(Style::default().fg(colors.muted))
                .block(block);
            frame.render_widget(text, area);
        }
        IndexState::Ready => {
            let items: Vec<ListItem> = app
                .index
                .iter()
                .map(|entry| ListItem::new(format!(" {} ", entry.title)))
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(colors.accent)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");

            frame.render_stateful_widget(list, area, &mut app.list_state);
        }
    }
}

fn render_mode_select(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let title = match app.session.load_state() {
        LoadState::Loading { passage_id } => app
            .entry_title(passage_id)
            .unwrap_or("Loading...")
            .to_string(),
        _ => app.session.title().to_string(),
    };

    let [title_area, options_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let subtitle = match app.session.load_state() {
        LoadState::Loading { .. } => "Loading…".to_string(),
        LoadState::Failed { message } => message.clone(),
        _ => "Choose a reading mode.".to_string(),
    };
    let heading = Paragraph::new(vec![
        Line::styled(format!(" {}", title), Style::default().bold()),
        Line::styled(format!(" {}", subtitle), Style::default().fg(colors.muted)),
    ]);
    frame.render_widget(heading, title_area);

    if app.session.passage().is_none() {
        return;
    }

    let tagged = app.session.selection().len();
    let items: Vec<ListItem> = ReadingMode::all()
        .iter()
        .map(|mode| {
            let enabled = app.session.can_enter(*mode);
            let mut detail = mode.description().to_string();
            if *mode == ReadingMode::Chunk {
                detail = if tagged > 0 {
                    format!("{} ({} tagged sentences)", detail, tagged)
                } else if enabled {
                    format!("{} (whole passage)", detail)
                } else {
                    "Tag sentences in full view first".to_string()
                };
            }

            let name_style = if enabled {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted)
            };
            ListItem::new(vec![
                Line::styled(format!(" {}", mode.display_name()), name_style),
                Line::styled(format!("   {}", detail), Style::default().fg(colors.muted)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(card(" Reading mode ".to_string(), colors))
        .highlight_style(Style::default().bg(colors.border))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, options_area, &mut app.mode_state);
}

fn render_reader(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let [title_area, body_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

    let heading = Paragraph::new(vec![
        Line::styled(format!(" {}", app.session.title()), Style::default().bold()),
        Line::styled(format!(" {}", app.session.subtitle()), Style::default().fg(colors.muted)),
    ]);
    frame.render_widget(heading, title_area);

    if app.session.engine().is_none() {
        let message = if app.session.is_loading() { "Loading…" } else { "No content available." };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(colors.muted)).block(card(String::new(), colors)),
            body_area,
        );
        app.content_area = None;
        return;
    }

    match app.session.mode() {
        Some(ReadingMode::Chunk) => render_sentence_frame(app, frame, body_area, colors),
        _ => render_full_passage(app, frame, body_area, colors),
    }
}

fn render_sentence_frame(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let Some(engine) = app.session.engine() else {
        return;
    };

    let [frame_area, controls_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    let revealed = engine.revealed_chunks();
    let active = engine.cursor().chunk_position();
    let translated = engine.cursor().translation_revealed_at();

    let mut lines: Vec<Line> = Vec::new();
    if revealed.is_empty() {
        lines.push(Line::styled(
            "Press Space to reveal the next chunk.",
            Style::default().fg(colors.muted),
        ));
    } else {
        for (i, chunk) in revealed.iter().enumerate() {
            let style = if Some(i) == active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::styled(chunk.source.clone(), style));
            if Some(i) == translated {
                lines.push(Line::styled(
                    format!("  {}", chunk.translation),
                    Style::default().fg(colors.accent).add_modifier(Modifier::ITALIC),
                ));
            }
            lines.push(Line::raw(""));
        }
    }

    let block = card(" Sentence ".to_string(), colors);
    let inner = block.inner(frame_area);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), frame_area);
    app.content_area = Some(inner);

    let enabled = |on: bool| {
        if on {
            Style::default().fg(colors.fg).bold()
        } else {
            Style::default().fg(colors.muted)
        }
    };
    let controls = Line::from(vec![
        Span::styled(" ◀ prev chunk ", enabled(engine.can_retreat())),
        Span::raw("   "),
        Span::styled(" next ▶ ", enabled(engine.can_advance())),
    ]);
    frame.render_widget(Paragraph::new(controls).centered(), controls_area);
}

fn render_full_passage(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let block = card(" Passage ".to_string(), colors);
    let inner = block.inner(area);
    let width = inner.width.saturating_sub(1) as usize;

    let mut lines: Vec<Line> = Vec::new();
    let mut line_map = Vec::new();
    let mut focus_range = (0u16, 0u16);

    if let Some(engine) = app.session.engine() {
        for (index, sentence) in engine.sentences().iter().enumerate() {
            let tagged = app.session.selection().is_selected(sentence.id());
            let focused = index == app.focused_sentence;

            let mut style = Style::default();
            if tagged {
                style = style.bg(colors.tagged).fg(Color::Rgb(0x11, 0x11, 0x11));
            }
            if focused {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            let start = lines.len() as u16;
            let marker = if focused { "▌" } else { " " };
            for text in wrap_words(&sentence.plain_text(), width) {
                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(colors.accent)),
                    Span::styled(text, style),
                ]));
                line_map.push(index);
            }
            if focused {
                focus_range = (start, lines.len() as u16);
            }
        }
    }

    // Bring a newly focused sentence on screen; manual scrolling sticks
    // until the focus moves again.
    let height = inner.height;
    if app.full_scroll_focus != Some(app.focused_sentence) {
        if focus_range.0 < app.full_scroll {
            app.full_scroll = focus_range.0;
        } else if focus_range.1 > app.full_scroll + height {
            app.full_scroll = focus_range.1.saturating_sub(height);
        }
        app.full_scroll_focus = Some(app.focused_sentence);
    }
    let max_scroll = (lines.len() as u16).saturating_sub(height);
    app.full_scroll = app.full_scroll.min(max_scroll);

    app.full_height = height;
    app.full_line_map = line_map;
    app.content_area = Some(inner);

    let paragraph = Paragraph::new(lines).block(block).scroll((app.full_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_end_popup(frame: &mut Frame, area: Rect, colors: &Palette) {
    let popup = popup_area(area, 48, 7);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .style(Style::default().bg(colors.card).fg(colors.fg))
        .title(" End of passage ");

    let text = Paragraph::new(vec![
        Line::raw("You've revealed every chunk."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[r]", Style::default().fg(colors.accent).bold()),
            Span::raw(" Start over   "),
            Span::styled("[f]", Style::default().fg(colors.accent).bold()),
            Span::raw(" Full view   "),
            Span::styled("[Esc]", Style::default().fg(colors.accent).bold()),
            Span::raw(" Stay"),
        ]),
    ])
    .wrap(Wrap { trim: true })
    .block(block);

    frame.render_widget(text, popup);
}

fn render_theme_picker(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let themes = Theme::all();
    let popup = popup_area(area, 30, themes.len() as u16 + 2);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent))
        .style(Style::default().bg(colors.card).fg(colors.fg))
        .title(" Theme ");

    let items: Vec<ListItem> = themes
        .iter()
        .map(|theme| {
            let swatch = palette(*theme);
            let prefix = if *theme == app.theme { "* " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(
                    format!(" {} ", theme.display_name()),
                    Style::default().bg(swatch.bg).fg(swatch.fg),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup, &mut app.theme_picker_state);
}

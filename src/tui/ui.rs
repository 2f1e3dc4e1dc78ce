//! UI rendering using ratatui
//!
//! Screens:
//! - Loading / Generating: a one-line status
//! - Playing: board, header, path, feedback and word history
//! - End of round: summary beside the final board
//! - Error: message display

use crate::app::{App, AppCoordinator, Screen, Tone};
use crate::game::round::{EndReason, RoundState};
use crate::game::special::{SpecialKind, SpecialTile};
use crate::game::{Position, TileSet};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::Loading => render_status(frame, "Loading dictionary..."),
        Screen::Generating { .. } => render_status(frame, "Generating board..."),
        Screen::Playing { app } => render_game(frame, app, coordinator.daily_seed()),
        Screen::Error { message } => render_error(frame, message),
    }
}

fn render_status(frame: &mut Frame, text: &str) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(frame.area());

    let status = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(status, layout[1]);

    let hint = Paragraph::new("q Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[2]);
}

fn render_game(frame: &mut Frame, app: &App, daily_seed: Option<&str>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Board and side panel
            Constraint::Length(1), // Key help
        ])
        .split(frame.area());

    render_header(frame, layout[0], app.round(), daily_seed);

    let board_width = (app.round().board().size() * 4 + 2) as u16;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width.max(20)), Constraint::Min(24)])
        .split(layout[1]);

    render_board(frame, columns[0], app);
    if app.is_round_over() {
        render_end_summary(frame, columns[1], app);
    } else {
        render_side_panel(frame, columns[1], app);
    }

    let keys = if app.is_round_over() {
        "n New round  q Quit"
    } else if app.is_wildcard_pending() {
        "A-Z Wild letter  Esc Cancel"
    } else {
        "Arrows Move  Space Select  Enter Submit  Esc Cancel  h Hint  n New  q Quit"
    };
    let footer = Paragraph::new(keys)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

fn render_header(frame: &mut Frame, area: Rect, round: &RoundState, daily_seed: Option<&str>) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Logo
            Constraint::Min(30),    // Score line
            Constraint::Length(18), // Mode
        ])
        .split(inner);

    let logo = Paragraph::new("TILECHAIN")
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Left);
    frame.render_widget(logo, header_layout[0]);

    let stats = format!(
        "Score {}  Streak {}  Moves {}  Grade {}",
        round.score(),
        round.streak(),
        format_moves(round.moves(), round.move_limit()),
        round.grade()
    );
    let stats = Paragraph::new(stats)
        .style(Style::default().fg(Color::Magenta).bold())
        .alignment(Alignment::Center);
    frame.render_widget(stats, header_layout[1]);

    let mode = match daily_seed {
        Some(seed) => format!("Daily {}", seed),
        None => "Free play".to_string(),
    };
    let mode = Paragraph::new(mode)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Right);
    frame.render_widget(mode, header_layout[2]);
}

fn render_board(frame: &mut Frame, area: Rect, app: &App) {
    let round = app.round();
    let board = round.board();
    let path = round.path();
    let hint: TileSet = app.hint().map(|found| found.tiles()).unwrap_or_default();

    let lines: Vec<Line> = (0..board.size())
        .map(|row| {
            let spans: Vec<Span> = (0..board.size())
                .map(|col| {
                    let pos = Position::new(row, col);
                    let special = round.specials().get(pos);
                    let style = cell_style(pos, app.cursor, path, round.chain(), &hint, special);
                    Span::styled(cell_text(board.get(pos), special), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let grid = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Board"),
    );
    frame.render_widget(grid, area);
}

fn render_side_panel(frame: &mut Frame, area: Rect, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Path word
            Constraint::Length(1), // Spacer
            Constraint::Length(2), // Feedback
            Constraint::Length(1), // Specials legend
            Constraint::Min(3),    // History
        ])
        .split(area);

    let word = app.round().path_word();
    let path = Paragraph::new(format!("> {}_", word)).style(Style::default().fg(Color::White).bold());
    frame.render_widget(path, layout[0]);

    let feedback = Paragraph::new(app.feedback.text.as_str())
        .style(Style::default().fg(tone_color(app.feedback.tone)))
        .wrap(Wrap { trim: true });
    frame.render_widget(feedback, layout[2]);

    let legend = Paragraph::new("# stone  ? wild  x x-factor  * multiplier  ~ shuffle")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(legend, layout[3]);

    render_history(frame, layout[4], app.round());
}

/// Committed words, newest first
fn render_history(frame: &mut Frame, area: Rect, round: &RoundState) {
    let items: Vec<ListItem> = round
        .records()
        .iter()
        .rev()
        .map(|record| {
            ListItem::new(format!("{:<12} +{}", record.word, record.score))
                .style(Style::default().fg(Color::Green))
        })
        .collect();

    let title = format!("Words ({} of ~{})", round.records().len(), round.discoverable_words());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title),
    );
    frame.render_widget(list, area);
}

fn render_end_summary(frame: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();
    let reason = match summary.end.map(|end| end.reason) {
        Some(EndReason::MoveLimit) => "OUT OF MOVES",
        _ => "NO MOVES LEFT",
    };

    let mut lines = vec![
        Line::from(reason).style(Style::default().fg(Color::Red).bold()),
        Line::from(""),
        Line::from(format!("Final Score: {}", summary.total_score))
            .style(Style::default().fg(Color::Yellow).bold()),
        Line::from(format!("Grade: {}", summary.grade)).style(Style::default().fg(Color::Yellow)),
        Line::from(format!("Words: {}  Moves: {}", summary.words.len(), summary.moves))
            .style(Style::default().fg(Color::Cyan)),
    ];
    if let Some(best) = &summary.best {
        lines.push(
            Line::from(format!("Best: {} (+{})", best.word, best.score))
                .style(Style::default().fg(Color::Green)),
        );
    }
    if !summary.rejected.is_empty() {
        lines.push(Line::from(""));
        for (reason, words) in &summary.rejected {
            lines.push(
                Line::from(format!("{}: {}", reason.label(), words.join(", ")))
                    .style(Style::default().fg(Color::DarkGray)),
            );
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Press n for a new round").style(Style::default().fg(Color::DarkGray)));

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("Round Over"),
        );
    frame.render_widget(panel, area);
}

fn render_error(frame: &mut Frame, message: &str) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Percentage(40),
        ])
        .margin(2)
        .split(frame.area());

    let error = Paragraph::new(format!("Error: {}", message))
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error, layout[1]);

    let hint = Paragraph::new("r Retry dictionary  e Use built-in word list  q Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, layout[2]);
}

/// Four columns per cell: letter, special glyph, padding.
fn cell_text(letter: char, special: Option<&SpecialTile>) -> String {
    let glyph = special.map(|tile| tile.kind.glyph()).unwrap_or(' ');
    format!(" {}{} ", letter, glyph)
}

fn cell_style(
    pos: Position,
    cursor: Position,
    path: &[Position],
    chain: &TileSet,
    hint: &TileSet,
    special: Option<&SpecialTile>,
) -> Style {
    let mut style = if path.contains(&pos) {
        Style::default().fg(Color::Black).bg(Color::Yellow).bold()
    } else if hint.contains(&pos) {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else if chain.contains(&pos) {
        Style::default().fg(Color::Cyan).bold()
    } else if special.is_some() {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::White)
    };
    if special.is_some_and(|tile| tile.kind == SpecialKind::Stone) {
        style = style.fg(Color::DarkGray);
    }
    if pos == cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn format_moves(moves: u32, limit: Option<u32>) -> String {
    match limit {
        Some(limit) => format!("{}/{}", moves, limit),
        None => moves.to_string(),
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Info => Color::White,
        Tone::Good => Color::Green,
        Tone::Warn => Color::Yellow,
        Tone::Bad => Color::Red,
    }
}

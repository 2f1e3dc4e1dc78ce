//! Tilechain - trace words through a letter grid, each one linked to the last
//!
//! Type nothing. Walk the board. Keep the chain alive.

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::error::Error;
use std::time::Duration;
use tracing::info;

use tilechain::app::{AppCoordinator, Move, Screen};
use tilechain::cli::Cli;
use tilechain::config::EngineConfig;
use tilechain::logging;
use tilechain::tui::{self, Tui};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let log_dir = cli.log_dir.clone().unwrap_or_else(logging::default_log_dir);
    let log_path = logging::init(&log_dir)?;
    info!(log = %log_path.display(), size = config.board.size, "Starting tilechain");

    let mut terminal = Tui::new()?;
    terminal.enter()?;

    let mut coordinator = AppCoordinator::new(config, cli.daily_seed());
    let poll_rate = Duration::from_millis(100);

    loop {
        coordinator.poll();
        terminal.draw(|frame| tui::render(frame, &coordinator))?;

        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut coordinator, key.code);
                }
            }
        }

        if coordinator.should_quit {
            break;
        }
    }

    info!("Exiting tilechain");
    // Terminal cleanup happens automatically via Tui::drop
    Ok(())
}

fn handle_key(coordinator: &mut AppCoordinator, code: KeyCode) {
    if let Screen::Playing { app } = &mut coordinator.screen {
        if app.is_wildcard_pending() {
            match code {
                KeyCode::Esc => app.on_cancel(),
                KeyCode::Char(c) if c.is_ascii_alphabetic() => app.on_letter(c),
                _ => {}
            }
            return;
        }
        match code {
            KeyCode::Up => app.on_move(Move::Up),
            KeyCode::Down => app.on_move(Move::Down),
            KeyCode::Left => app.on_move(Move::Left),
            KeyCode::Right => app.on_move(Move::Right),
            KeyCode::Char(' ') => app.on_tap(),
            KeyCode::Enter => app.on_submit(),
            KeyCode::Esc => app.on_cancel(),
            KeyCode::Char('h') => app.on_hint(),
            KeyCode::Char('n') => coordinator.new_round(),
            KeyCode::Char('q') => coordinator.quit(),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => coordinator.quit(),
        KeyCode::Char('r') => coordinator.retry_dictionary(),
        KeyCode::Char('e') => coordinator.use_embedded_dictionary(),
        _ => {}
    }
}

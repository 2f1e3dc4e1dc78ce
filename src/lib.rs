//! Tilechain - a chain-linked tile-path word game
//!
//! Trace words through adjacent cells of a letter grid. Every word after the
//! first must reuse at least one tile of the word before it. The engine covers
//! board generation with a solvability check, special tiles, scoring, grading
//! and game-over detection; the terminal front end lives in [`app`] and [`tui`].

pub mod app;
pub mod cli;
pub mod config;
pub mod game;
pub mod logging;
pub mod tui;

pub use config::{ConfigError, EngineConfig};
pub use game::board::Board;
pub use game::dictionary::{Dictionary, DictionaryError, DictionaryStatus};
pub use game::round::{Action, Outcome, RoundState, Rules};
pub use game::validation::Rejection;
pub use game::{Position, TileSet};

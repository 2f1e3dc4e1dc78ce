//! Command-line interface for tilechain.

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::game::wildcard::WildcardMode;

/// Tilechain - trace words through a letter grid, each one sharing a tile with the last
#[derive(Parser, Debug)]
#[command(name = "tilechain")]
#[command(about = "Chain-linked tile-path word game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Newline-delimited word list (defaults to the built-in list)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Board side length
    #[arg(long)]
    pub size: Option<usize>,

    /// Daily puzzle: same board and move limit for everyone with the same seed.
    /// The seed defaults to today's UTC date.
    #[arg(long, value_name = "SEED")]
    pub daily: Option<Option<String>>,

    /// How wild tiles get their letter
    #[arg(long)]
    pub wildcard: Option<WildcardMode>,

    /// Directory for tilechain.log
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Seed for daily mode, if enabled.
    pub fn daily_seed(&self) -> Option<String> {
        self.daily
            .as_ref()
            .map(|seed| seed.clone().unwrap_or_else(today_seed))
    }

    /// Fold command-line overrides into the loaded config.
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(size) = self.size {
            config.board.size = size;
        }
        if let Some(path) = &self.dictionary {
            config.play.dictionary = Some(path.clone());
        }
        if let Some(mode) = self.wildcard {
            config.play.wildcard = mode;
        }
    }
}

/// Today's UTC date as `YYYY-MM-DD`.
pub fn today_seed() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

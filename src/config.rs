//! Engine configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! is a valid configuration:
//!
//! ```toml
//! [board]
//! size = 5
//!
//! [generation]
//! min_words = 12
//! vowel_min = 0.35
//! vowel_max = 0.55
//!
//! [scoring]
//! streak_target_len = 5
//!
//! [benchmarks]
//! points_per_word = 12.0
//!
//! [specials]
//! max_count = 3
//!
//! [play]
//! wildcard = "auto"
//! daily_move_limit = [15, 25]
//! ```

use derive_more::{Display, Error, From};
use directories::ProjectDirs;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::game::board::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::game::prober::DEFAULT_NODE_BUDGET;
use crate::game::refiner::GenerationSettings;
use crate::game::round::Rules;
use crate::game::sampler::seeded_rng;
use crate::game::scoring::{Grade, ScaledBenchmarks, ScoringPolicy};
use crate::game::special::SpawnPolicy;
use crate::game::wildcard::WildcardMode;

/// File name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration error.
#[derive(Debug, Display, Error, From)]
pub enum ConfigError {
    #[display("cannot read config file {}: {source}", path.display())]
    #[from(ignore)]
    Read { path: PathBuf, source: io::Error },
    #[display("cannot parse config: {_0}")]
    Parse(toml::de::Error),
    #[display("invalid config value: {reason}")]
    #[from(ignore)]
    Invalid { reason: String },
}

impl ConfigError {
    fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub size: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { size: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    pub wildcard: WildcardMode,
    /// Word list file; the embedded list is used when unset
    pub dictionary: Option<PathBuf>,
    /// Move cap for ordinary rounds
    pub move_limit: Option<u32>,
    /// Inclusive range the daily move cap is drawn from
    pub daily_move_limit: [u32; 2],
    pub external_multiplier: f64,
    /// Specials start spawning once the score reaches this grade
    pub spawn_threshold: Grade,
    /// Node budget for game-over checks and hints
    pub node_budget: usize,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            wildcard: WildcardMode::Auto,
            dictionary: None,
            move_limit: None,
            daily_move_limit: [15, 25],
            external_multiplier: 1.0,
            spawn_threshold: Grade::Bronze,
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardConfig,
    pub generation: GenerationSettings,
    pub scoring: ScoringPolicy,
    pub benchmarks: ScaledBenchmarks,
    pub specials: SpawnPolicy,
    pub play: PlayConfig,
}

impl EngineConfig {
    /// Parse from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let text = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        info!(size = config.board.size, "Config loaded");
        Ok(config)
    }

    /// `explicit` if given, else the platform config file if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `config.toml` in the OS-standard config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tilechain").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.board.size;
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(ConfigError::invalid(format!(
                "board size {} outside {}..={}",
                size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
            )));
        }
        let generation = &self.generation;
        if !(0.0..=1.0).contains(&generation.vowel_min)
            || !(0.0..=1.0).contains(&generation.vowel_max)
            || generation.vowel_min > generation.vowel_max
        {
            return Err(ConfigError::invalid("vowel band must satisfy 0 <= vowel_min <= vowel_max <= 1"));
        }
        if generation.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts must be at least 1"));
        }
        let specials = &self.specials;
        if specials.min_count > specials.max_count || specials.min_expiry > specials.max_expiry {
            return Err(ConfigError::invalid("special count and expiry ranges must be ordered"));
        }
        if specials.weights.iter().any(|(_, w)| *w < 0.0) {
            return Err(ConfigError::invalid("special weights must be non-negative"));
        }
        if specials.multiplier_values.is_empty() {
            return Err(ConfigError::invalid("multiplier_values cannot be empty"));
        }
        let [low, high] = self.play.daily_move_limit;
        if low == 0 || low > high {
            return Err(ConfigError::invalid("daily_move_limit must be a range like [15, 25]"));
        }
        if self.play.external_multiplier <= 0.0 {
            return Err(ConfigError::invalid("external_multiplier must be positive"));
        }
        Ok(())
    }

    /// Round rules derived from this configuration.
    pub fn rules(&self) -> Rules {
        Rules {
            scoring: self.scoring.clone(),
            specials: self.specials.clone(),
            spawn_threshold: self.play.spawn_threshold,
            external_multiplier: self.play.external_multiplier,
            node_budget: self.play.node_budget,
        }
    }

    /// Move cap for a round: drawn from the daily range when a seed is given.
    pub fn move_limit(&self, daily_seed: Option<&str>) -> Option<u32> {
        match daily_seed {
            Some(seed) => {
                let [low, high] = self.play.daily_move_limit;
                // separate stream from the board so both stay stable
                let mut rng = seeded_rng(&format!("{}#moves", seed));
                Some(rng.random_range(low..=high.max(low)))
            }
            None => self.play.move_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_toml(
            r#"
            [board]
            size = 4

            [generation]
            min_words = 20

            [play]
            wildcard = "explicit"
            move_limit = 10
            spawn_threshold = "silver"
            "#,
        )
        .unwrap();
        assert_eq!(config.board.size, 4);
        assert_eq!(config.generation.min_words, 20);
        assert_eq!(config.generation.vowel_min, 0.35);
        assert_eq!(config.play.wildcard, WildcardMode::Explicit);
        assert_eq!(config.move_limit(None), Some(10));
        assert_eq!(config.rules().spawn_threshold, Grade::Silver);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_toml("[board]\nsize = 2\n"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml("[generation]\nvowel_min = 0.8\nvowel_max = 0.2\n"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml("[board]\nsize = \"big\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[board]\nsize = 6").unwrap();
        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.board.size, 6);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = EngineConfig::load(Some(Path::new("/no/such/tilechain.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_daily_move_limit_is_stable() {
        let config = EngineConfig::default();
        let a = config.move_limit(Some("2024-06-01"));
        assert_eq!(a, config.move_limit(Some("2024-06-01")));
        let limit = a.unwrap();
        assert!((15..=25).contains(&limit));
        assert_eq!(config.move_limit(None), None);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = EngineConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }
}

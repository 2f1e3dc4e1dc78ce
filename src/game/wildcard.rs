//! Wildcard resolution strategies

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::dictionary::Dictionary;

/// Outcome of asking a strategy to fill the wild letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Use this letter
    Letter(char),
    /// Ask the player
    Pending,
    /// Nothing fits
    NoMatch,
}

/// Chooses the letter a wild tile stands for.
pub trait WildcardResolver {
    /// `letters` is the uppercase word with the wild cell at `wild_index`.
    fn resolve(
        &self,
        letters: &[char],
        wild_index: usize,
        dictionary: &Dictionary,
        used: &BTreeSet<String>,
    ) -> Resolution;
}

/// Tries A through Z and takes the first letter that makes an unused word.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoResolver;

impl WildcardResolver for AutoResolver {
    fn resolve(
        &self,
        letters: &[char],
        wild_index: usize,
        dictionary: &Dictionary,
        used: &BTreeSet<String>,
    ) -> Resolution {
        let mut candidate = letters.to_vec();
        for letter in 'A'..='Z' {
            candidate[wild_index] = letter;
            let word: String = candidate.iter().collect();
            if dictionary.contains(&word) && !used.contains(&word) {
                return Resolution::Letter(letter);
            }
        }
        Resolution::NoMatch
    }
}

/// Always defers to the player.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitResolver;

impl WildcardResolver for ExplicitResolver {
    fn resolve(&self, _: &[char], _: usize, _: &Dictionary, _: &BTreeSet<String>) -> Resolution {
        Resolution::Pending
    }
}

/// Which resolver a round uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WildcardMode {
    #[default]
    Auto,
    Explicit,
}

impl WildcardMode {
    pub fn resolver(self) -> Box<dyn WildcardResolver> {
        match self {
            WildcardMode::Auto => Box::new(AutoResolver),
            WildcardMode::Explicit => Box::new(ExplicitResolver),
        }
    }
}

impl fmt::Display for WildcardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WildcardMode::Auto => write!(f, "auto"),
            WildcardMode::Explicit => write!(f, "explicit"),
        }
    }
}

impl FromStr for WildcardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(WildcardMode::Auto),
            "explicit" => Ok(WildcardMode::Explicit),
            other => Err(format!("unknown wildcard mode '{}' (expected auto or explicit)", other)),
        }
    }
}

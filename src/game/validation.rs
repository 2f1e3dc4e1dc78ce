//! Submission checks and rejection reasons
//!
//! A submitted path is checked in this order:
//! 1. dictionary ready
//! 2. at least three letters
//! 3. at most one wild tile (one wild defers to the resolver)
//! 4. word in the dictionary
//! 5. word not already played
//! 6. no stone in the path
//! 7. shares a tile with the previous word (after the first word)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::dictionary::Dictionary;
use super::special::SpecialGrid;
use super::{Position, TileSet, MIN_WORD_LENGTH};

/// Why a submission was refused. Nothing committed changes on any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rejection {
    DictionaryUnavailable,
    WordTooShort,
    WordNotFound,
    WordAlreadyUsed,
    ChainViolation,
    BlockedTile,
    AmbiguousWildcard,
}

impl Rejection {
    /// Short player-facing message
    pub fn message(&self) -> String {
        match self {
            Rejection::DictionaryUnavailable => "Dictionary unavailable".to_string(),
            Rejection::WordTooShort => format!("Too short (need {}+ letters)", MIN_WORD_LENGTH),
            Rejection::WordNotFound => "Not in dictionary".to_string(),
            Rejection::WordAlreadyUsed => "Already played".to_string(),
            Rejection::ChainViolation => "Must reuse a tile from the last word".to_string(),
            Rejection::BlockedTile => "Blocked by stone".to_string(),
            Rejection::AmbiguousWildcard => "Wildcard cannot be resolved".to_string(),
        }
    }

    /// Summary heading
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::DictionaryUnavailable => "Dictionary Unavailable",
            Rejection::WordTooShort => "Too Short",
            Rejection::WordNotFound => "Not In Dictionary",
            Rejection::WordAlreadyUsed => "Already Played",
            Rejection::ChainViolation => "Broke The Chain",
            Rejection::BlockedTile => "Blocked",
            Rejection::AmbiguousWildcard => "Bad Wildcard",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

pub fn check_length(path: &[Position]) -> Result<(), Rejection> {
    if path.len() < MIN_WORD_LENGTH {
        Err(Rejection::WordTooShort)
    } else {
        Ok(())
    }
}

/// Index in the path of the single wild tile, if any.
pub fn find_wild(path: &[Position], specials: &SpecialGrid) -> Result<Option<usize>, Rejection> {
    let mut wilds = path
        .iter()
        .enumerate()
        .filter(|(_, p)| specials.is_wild(**p))
        .map(|(i, _)| i);
    match (wilds.next(), wilds.next()) {
        (None, _) => Ok(None),
        (Some(i), None) => Ok(Some(i)),
        (Some(_), Some(_)) => Err(Rejection::AmbiguousWildcard),
    }
}

/// Dictionary and repeat checks on a fully resolved uppercase word.
pub fn check_word(
    word: &str,
    dictionary: &Dictionary,
    used: &BTreeSet<String>,
) -> Result<(), Rejection> {
    if !dictionary.contains(word) {
        return Err(Rejection::WordNotFound);
    }
    if used.contains(word) {
        return Err(Rejection::WordAlreadyUsed);
    }
    Ok(())
}

/// Stone and chain checks on the tiles.
pub fn check_tiles(
    path: &[Position],
    specials: &SpecialGrid,
    chain: &TileSet,
) -> Result<(), Rejection> {
    if path.iter().any(|&p| specials.is_stone(p)) {
        return Err(Rejection::BlockedTile);
    }
    if !chain.is_empty() && !path.iter().any(|p| chain.contains(p)) {
        return Err(Rejection::ChainViolation);
    }
    Ok(())
}

/// Steps 4 to 7 for a word whose letters are all known.
pub fn validate_resolved(
    word: &str,
    path: &[Position],
    dictionary: &Dictionary,
    used: &BTreeSet<String>,
    specials: &SpecialGrid,
    chain: &TileSet,
) -> Result<(), Rejection> {
    check_word(word, dictionary, used)?;
    check_tiles(path, specials, chain)
}

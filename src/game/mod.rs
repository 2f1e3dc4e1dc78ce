//! Game logic: letters, boards, the word search, and the round state machine

pub mod board;
pub mod dictionary;
pub mod prober;
pub mod refiner;
pub mod round;
pub mod sampler;
pub mod scoring;
pub mod special;
pub mod terminal;
pub mod validation;
pub mod wildcard;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// English letter frequencies in percent (sums to ~100).
pub const LETTER_FREQUENCIES: [(char, f64); 26] = [
    ('A', 8.167),
    ('B', 1.492),
    ('C', 2.782),
    ('D', 4.253),
    ('E', 12.702),
    ('F', 2.228),
    ('G', 2.015),
    ('H', 6.094),
    ('I', 6.966),
    ('J', 0.153),
    ('K', 0.772),
    ('L', 4.025),
    ('M', 2.406),
    ('N', 6.749),
    ('O', 7.507),
    ('P', 1.929),
    ('Q', 0.095),
    ('R', 5.987),
    ('S', 6.327),
    ('T', 9.056),
    ('U', 2.758),
    ('V', 0.978),
    ('W', 2.360),
    ('X', 0.150),
    ('Y', 1.974),
    ('Z', 0.074),
];

pub const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

/// Most copies of one letter allowed on a board.
pub const MAX_LETTER_COUNT: usize = 4;

/// Minimum word length for a discoverable or playable word
pub const MIN_WORD_LENGTH: usize = 3;

/// Whether an uppercase letter is a vowel.
pub fn is_vowel(letter: char) -> bool {
    VOWELS.contains(&letter)
}

/// Index 0..26 of an uppercase ASCII letter.
#[inline]
pub fn letter_index(letter: char) -> usize {
    (letter as u8 - b'A') as usize
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev adjacency (the 8 surrounding cells, not the cell itself).
    pub fn is_adjacent(&self, other: &Position) -> bool {
        *self != *other && self.row.abs_diff(other.row) <= 1 && self.col.abs_diff(other.col) <= 1
    }

    /// The 8 neighbours that fall inside a `size`×`size` grid.
    pub fn neighbors(&self, size: usize) -> impl Iterator<Item = Position> + '_ {
        let (row, col) = (self.row as isize, self.col as isize);
        (-1isize..=1)
            .flat_map(move |dr| (-1isize..=1).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| dr != 0 || dc != 0)
            .filter_map(move |(dr, dc)| {
                let (r, c) = (row + dr, col + dc);
                (r >= 0 && c >= 0 && (r as usize) < size && (c as usize) < size)
                    .then(|| Position::new(r as usize, c as usize))
            })
    }

    /// The 4 diagonal neighbours that fall inside a `size`×`size` grid.
    pub fn diagonals(&self, size: usize) -> Vec<Position> {
        self.neighbors(size)
            .filter(|p| p.row != self.row && p.col != self.col)
            .collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// An unordered set of board cells, used for word footprints and the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSet(BTreeSet<Position>);

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pos: Position) -> bool {
        self.0.insert(pos)
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.0.contains(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn intersects(&self, other: &TileSet) -> bool {
        self.shared_with(other) > 0
    }

    /// Number of cells present in both sets.
    pub fn shared_with(&self, other: &TileSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.0.iter()
    }
}

impl FromIterator<Position> for TileSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Position> for TileSet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for TileSet {
    type Item = Position;
    type IntoIter = std::collections::btree_set::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> FromIterator<&'a Position> for TileSet {
    fn from_iter<I: IntoIterator<Item = &'a Position>>(iter: I) -> Self {
        Self(iter.into_iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequencies_sum_to_about_one_hundred() {
        let total: f64 = LETTER_FREQUENCIES.iter().map(|(_, f)| f).sum();
        assert!((total - 100.0).abs() < 0.1, "total was {}", total);
    }

    #[test]
    fn test_adjacency_is_chebyshev() {
        let center = Position::new(1, 1);
        assert!(center.is_adjacent(&Position::new(0, 0)));
        assert!(center.is_adjacent(&Position::new(2, 1)));
        assert!(!center.is_adjacent(&Position::new(1, 1)));
        assert!(!center.is_adjacent(&Position::new(3, 1)));
    }

    #[test]
    fn test_neighbors_clipped_at_corner() {
        let corner = Position::new(0, 0);
        let neighbors: Vec<_> = corner.neighbors(4).collect();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(Position::new(1, 1).neighbors(4).count(), 8);
    }

    #[test]
    fn test_diagonals() {
        let mut diagonals = Position::new(1, 1).diagonals(4);
        diagonals.sort();
        assert_eq!(
            diagonals,
            vec![
                Position::new(0, 0),
                Position::new(0, 2),
                Position::new(2, 0),
                Position::new(2, 2)
            ]
        );
        assert_eq!(Position::new(0, 0).diagonals(4), vec![Position::new(1, 1)]);
    }

    #[test]
    fn test_position_key_format() {
        assert_eq!(Position::new(2, 3).to_string(), "2,3");
    }

    #[test]
    fn test_tileset_sharing() {
        let a: TileSet = [Position::new(0, 0), Position::new(0, 1)].into_iter().collect();
        let b: TileSet = [Position::new(0, 1), Position::new(1, 1)].into_iter().collect();
        let c: TileSet = [Position::new(3, 3)].into_iter().collect();
        assert!(a.intersects(&b));
        assert_eq!(a.shared_with(&b), 1);
        assert!(!a.intersects(&c));
    }
}

//! The letter grid and its generator

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::sampler::{sample_letter, ConstrainedSampler};
use super::Position;

/// Smallest and largest supported grid side.
pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 10;

/// An `N×N` grid of uppercase letters, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<char>,
}

impl Board {
    /// Build from row strings, e.g. `["CATS", "RATE", "ATES", "BATH"]`.
    ///
    /// Returns `None` unless every row has exactly `rows.len()` letters.
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            let letters: Vec<char> = row.chars().map(|c| c.to_ascii_uppercase()).collect();
            if letters.len() != size || !letters.iter().all(|c| c.is_ascii_uppercase()) {
                return None;
            }
            cells.extend(letters);
        }
        (size > 0).then_some(Self { size, cells })
    }

    /// Unconstrained board: each cell an independent frequency-weighted draw.
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let cells = (0..size * size).map(|_| sample_letter(rng)).collect();
        Self { size, cells }
    }

    /// Board with at most four of any letter and every `Q` next to a `U`.
    pub fn generate_constrained<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut sampler = ConstrainedSampler::new();
        let cells = (0..size * size).map(|_| sampler.draw(rng)).collect();
        let mut board = Self { size, cells };
        board.repair_q(&mut sampler, rng);
        board
    }

    /// Replace each `Q` that has no neighbouring `U`.
    fn repair_q<R: Rng + ?Sized>(&mut self, sampler: &mut ConstrainedSampler, rng: &mut R) {
        for pos in self.positions().collect::<Vec<_>>() {
            if self.get(pos) != 'Q' || self.has_neighbor(pos, 'U') {
                continue;
            }
            sampler.release('Q');
            let letter = sampler.draw_excluding(rng, &['Q']);
            debug!(%pos, %letter, "replaced stranded Q");
            self.set(pos, letter);
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Position) -> char {
        self.cells[pos.row * self.size + pos.col]
    }

    pub fn set(&mut self, pos: Position, letter: char) {
        let size = self.size;
        self.cells[pos.row * size + pos.col] = letter;
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// All positions, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..size * size).map(move |i| Position::new(i / size, i % size))
    }

    /// Every letter on the board, row-major.
    pub fn letters(&self) -> &[char] {
        &self.cells
    }

    /// Replace every letter at once (row-major order).
    pub fn set_letters(&mut self, letters: Vec<char>) {
        debug_assert_eq!(letters.len(), self.cells.len());
        self.cells = letters;
    }

    /// How many times `letter` appears.
    pub fn count(&self, letter: char) -> usize {
        self.cells.iter().filter(|&&c| c == letter).count()
    }

    fn has_neighbor(&self, pos: Position, letter: char) -> bool {
        pos.neighbors(self.size).any(|n| self.get(n) == letter)
    }

    /// Letters spelled by a path.
    pub fn spell(&self, path: &[Position]) -> String {
        path.iter().map(|&p| self.get(p)).collect()
    }

    /// Fraction of cells holding a vowel.
    pub fn vowel_ratio(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let vowels = self.cells.iter().filter(|&&c| super::is_vowel(c)).count();
        vowels as f64 / self.cells.len() as f64
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.size).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().collect();
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

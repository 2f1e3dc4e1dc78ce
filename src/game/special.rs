//! Special tiles: the grid that sits on top of the board, plus tile effects
//!
//! | kind | effect |
//! |---|---|
//! | stone | cell cannot be used in a path |
//! | wild | stands for any letter; overwritten by the resolved letter |
//! | xfactor | re-rolls its four diagonal neighbours on commit |
//! | multiplier | multiplies the word total |
//! | shuffle | redistributes every letter on the board |

use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::board::Board;
use super::sampler::ConstrainedSampler;
use super::{Position, TileSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    Stone,
    Wild,
    XFactor,
    Multiplier(u32),
    Shuffle,
}

impl SpecialKind {
    /// Single-character board glyph.
    pub fn glyph(&self) -> char {
        match self {
            SpecialKind::Stone => '#',
            SpecialKind::Wild => '?',
            SpecialKind::XFactor => 'x',
            SpecialKind::Multiplier(_) => '*',
            SpecialKind::Shuffle => '~',
        }
    }

    pub fn label(&self) -> String {
        match self {
            SpecialKind::Stone => "Stone".to_string(),
            SpecialKind::Wild => "Wild".to_string(),
            SpecialKind::XFactor => "X-Factor".to_string(),
            SpecialKind::Multiplier(value) => format!("x{}", value),
            SpecialKind::Shuffle => "Shuffle".to_string(),
        }
    }
}

/// A special tile and the number of commits it has left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTile {
    pub kind: SpecialKind,
    pub expiry_turns: u32,
}

impl SpecialTile {
    pub fn new(kind: SpecialKind, expiry_turns: u32) -> Self {
        Self { kind, expiry_turns }
    }
}

/// Kinds the spawner can pick, before a multiplier value is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    Stone,
    Wild,
    XFactor,
    Multiplier,
    Shuffle,
}

/// How many specials appear after a commit, what they are and how long they last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPolicy {
    pub enabled: bool,
    pub min_count: usize,
    pub max_count: usize,
    pub min_expiry: u32,
    pub max_expiry: u32,
    pub weights: Vec<(SpawnKind, f64)>,
    pub multiplier_values: Vec<u32>,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_count: 1,
            max_count: 3,
            min_expiry: 1,
            max_expiry: 5,
            weights: vec![
                (SpawnKind::Stone, 2.0),
                (SpawnKind::Wild, 2.0),
                (SpawnKind::XFactor, 2.0),
                (SpawnKind::Multiplier, 3.0),
                (SpawnKind::Shuffle, 1.0),
            ],
            multiplier_values: vec![2, 3, 4],
        }
    }
}

impl SpawnPolicy {
    fn pick_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SpecialKind> {
        let dist = WeightedIndex::new(self.weights.iter().map(|(_, w)| *w)).ok()?;
        let kind = match self.weights[dist.sample(rng)].0 {
            SpawnKind::Stone => SpecialKind::Stone,
            SpawnKind::Wild => SpecialKind::Wild,
            SpawnKind::XFactor => SpecialKind::XFactor,
            SpawnKind::Multiplier => {
                SpecialKind::Multiplier(*self.multiplier_values.choose(rng).unwrap_or(&2))
            }
            SpawnKind::Shuffle => SpecialKind::Shuffle,
        };
        Some(kind)
    }
}

/// Special tiles laid over the board, one optional tile per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialGrid {
    size: usize,
    cells: Vec<Option<SpecialTile>>,
}

impl SpecialGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Whether this grid lays exactly over a `size`-sided board.
    pub fn fits(&self, size: usize) -> bool {
        self.size == size && self.cells.len() == size * size
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.size + pos.col
    }

    pub fn get(&self, pos: Position) -> Option<&SpecialTile> {
        self.cells.get(self.index(pos)).and_then(Option::as_ref)
    }

    pub fn set(&mut self, pos: Position, tile: SpecialTile) {
        let idx = self.index(pos);
        self.cells[idx] = Some(tile);
    }

    pub fn clear(&mut self, pos: Position) -> Option<SpecialTile> {
        let idx = self.index(pos);
        self.cells[idx].take()
    }

    pub fn kind(&self, pos: Position) -> Option<SpecialKind> {
        self.get(pos).map(|t| t.kind)
    }

    pub fn is_stone(&self, pos: Position) -> bool {
        self.kind(pos) == Some(SpecialKind::Stone)
    }

    pub fn is_wild(&self, pos: Position) -> bool {
        self.kind(pos) == Some(SpecialKind::Wild)
    }

    /// Occupied cells and their tiles, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &SpecialTile)> {
        let size = self.size;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|tile| (Position::new(i / size, i % size), tile))
        })
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count down every remaining tile; tiles reaching zero revert to none.
    /// Returns the cells that expired.
    pub fn tick_expiry(&mut self) -> Vec<Position> {
        let size = self.size;
        let mut expired = Vec::new();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if let Some(tile) = cell {
                tile.expiry_turns = tile.expiry_turns.saturating_sub(1);
                if tile.expiry_turns == 0 {
                    *cell = None;
                    expired.push(Position::new(i / size, i % size));
                }
            }
        }
        expired
    }

    /// Place `min_count..=max_count` new specials on empty cells.
    pub fn spawn<R: Rng + ?Sized>(&mut self, policy: &SpawnPolicy, rng: &mut R) -> Vec<Position> {
        if !policy.enabled || policy.max_count == 0 {
            return Vec::new();
        }
        let empty: Vec<Position> = (0..self.cells.len())
            .filter(|&i| self.cells[i].is_none())
            .map(|i| Position::new(i / self.size, i % self.size))
            .collect();
        let count = rng.random_range(policy.min_count.min(policy.max_count)..=policy.max_count);
        let chosen: Vec<Position> = empty.choose_multiple(rng, count).copied().collect();

        let mut spawned = Vec::with_capacity(chosen.len());
        for pos in chosen {
            let Some(kind) = policy.pick_kind(rng) else {
                break;
            };
            let low = policy.min_expiry.max(1);
            let expiry = rng.random_range(low..=policy.max_expiry.max(low));
            self.set(pos, SpecialTile::new(kind, expiry));
            debug!(%pos, ?kind, expiry, "special spawned");
            spawned.push(pos);
        }
        spawned
    }
}

/// Re-roll the diagonal neighbours of `pos`, respecting the letter cap,
/// and strip any special tile on them. Returns the changed cells.
pub fn apply_xfactor<R: Rng + ?Sized>(
    board: &mut Board,
    specials: &mut SpecialGrid,
    pos: Position,
    rng: &mut R,
) -> TileSet {
    let mut sampler = ConstrainedSampler::from_letters(board.letters().iter().copied());
    let mut changed = TileSet::new();
    for diagonal in pos.diagonals(board.size()) {
        sampler.release(board.get(diagonal));
        let letter = sampler.draw(rng);
        board.set(diagonal, letter);
        specials.clear(diagonal);
        changed.insert(diagonal);
    }
    changed
}

/// Collect every letter, trim any letter past the cap with fresh capped
/// draws, permute and lay the letters back down. Returns the changed cells.
pub fn apply_shuffle<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> TileSet {
    let before = board.letters().to_vec();
    let mut sampler = ConstrainedSampler::new();
    let mut letters = before.clone();
    let overflow: Vec<usize> = (0..letters.len())
        .filter(|&i| !sampler.admit(letters[i]))
        .collect();
    for i in overflow {
        letters[i] = sampler.draw(rng);
    }
    letters.shuffle(rng);
    board.set_letters(letters);
    board
        .positions()
        .filter(|&p| board.get(p) != before[p.row * board.size() + p.col])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MAX_LETTER_COUNT;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_expiry_counts_down_and_clears() {
        let mut grid = SpecialGrid::new(3);
        grid.set(Position::new(0, 0), SpecialTile::new(SpecialKind::Stone, 2));
        grid.set(Position::new(1, 1), SpecialTile::new(SpecialKind::Wild, 1));

        let expired = grid.tick_expiry();
        assert_eq!(expired, vec![Position::new(1, 1)]);
        assert_eq!(grid.get(Position::new(0, 0)).unwrap().expiry_turns, 1);
        assert!(grid.get(Position::new(1, 1)).is_none());

        grid.tick_expiry();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_spawn_uses_empty_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = SpecialGrid::new(4);
        let policy = SpawnPolicy::default();
        for _ in 0..20 {
            let before = grid.clone();
            let spawned = grid.spawn(&policy, &mut rng);
            assert!((1..=3).contains(&spawned.len()) || before.len() + spawned.len() == 16);
            for pos in &spawned {
                assert!(before.get(*pos).is_none());
                let tile = grid.get(*pos).unwrap();
                assert!((1..=5).contains(&tile.expiry_turns));
                if let SpecialKind::Multiplier(v) = tile.kind {
                    assert!([2, 3, 4].contains(&v));
                }
            }
            grid.tick_expiry();
        }
    }

    #[test]
    fn test_spawn_disabled() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = SpecialGrid::new(4);
        let policy = SpawnPolicy {
            enabled: false,
            ..SpawnPolicy::default()
        };
        assert!(grid.spawn(&policy, &mut rng).is_empty());
    }

    #[test]
    fn test_xfactor_rerolls_diagonals() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut board = Board::from_rows(&["ABC", "DEF", "GHI"]).unwrap();
        let mut grid = SpecialGrid::new(3);
        grid.set(Position::new(0, 0), SpecialTile::new(SpecialKind::Stone, 3));
        grid.set(Position::new(0, 1), SpecialTile::new(SpecialKind::Stone, 3));

        let changed = apply_xfactor(&mut board, &mut grid, Position::new(1, 1), &mut rng);
        assert_eq!(changed.len(), 4);
        assert!(changed.contains(&Position::new(0, 0)));
        assert!(!changed.contains(&Position::new(0, 1)));
        assert!(grid.get(Position::new(0, 0)).is_none());
        assert!(grid.is_stone(Position::new(0, 1)));
        assert_eq!(board.get(Position::new(1, 1)), 'E');
    }

    #[test]
    fn test_shuffle_enforces_letter_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut board = Board::from_rows(&["EEEE", "EEEE", "AAAA", "AAAT"]).unwrap();
        apply_shuffle(&mut board, &mut rng);
        assert_eq!(board.letters().len(), 16);
        for letter in 'A'..='Z' {
            assert!(board.count(letter) <= MAX_LETTER_COUNT, "{}:\n{}", letter, board);
        }
    }

    #[test]
    fn test_shuffle_keeps_letters_when_under_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut board = Board::from_rows(&["CATS", "RATE", "BOIL", "MUND"]).unwrap();
        let mut before = board.letters().to_vec();
        apply_shuffle(&mut board, &mut rng);
        let mut after = board.letters().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(SpecialKind::Stone.glyph(), '#');
        assert_eq!(SpecialKind::Multiplier(3).label(), "x3");
    }
}

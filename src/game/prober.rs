//! Solvability prober: bounded depth-first word search over a board
//!
//! Rooted at every cell, the search grows paths through unvisited
//! neighbours and prunes as soon as the spelled string is no longer a prefix
//! of any dictionary word. A node budget caps the total work; when it runs
//! out the probe stops and reports whatever it found so far.

use std::collections::HashSet;
use std::ops::ControlFlow;
use tracing::{debug, instrument};

use super::board::Board;
use super::dictionary::Dictionary;
use super::{Position, TileSet, MIN_WORD_LENGTH};

/// Default cap on extension steps for one probe.
pub const DEFAULT_NODE_BUDGET: usize = 30_000;

/// Limits for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeLimits {
    /// Extension steps allowed before the whole probe aborts
    pub node_budget: usize,
    /// Stop early once this many words are found and a link exists
    pub target_words: Option<usize>,
}

impl Default for ProbeLimits {
    fn default() -> Self {
        Self {
            node_budget: DEFAULT_NODE_BUDGET,
            target_words: None,
        }
    }
}

impl ProbeLimits {
    /// No budget and no early exit: every word on the board is found.
    pub fn unbounded() -> Self {
        Self {
            node_budget: usize::MAX,
            target_words: None,
        }
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target_words = Some(target);
        self
    }
}

/// A word and one path that spells it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundWord {
    /// Lowercase, as stored in the dictionary
    pub word: String,
    pub path: Vec<Position>,
}

impl FoundWord {
    pub fn tiles(&self) -> TileSet {
        self.path.iter().collect()
    }
}

/// What a probe discovered.
#[derive(Debug, Clone, Default)]
pub struct ProbeResult {
    /// Distinct words in discovery order
    pub found: Vec<FoundWord>,
    /// Whether two recorded words share at least one tile
    pub link_found: bool,
    /// Per-cell count of recorded words touching it, row-major
    pub usage: Vec<u32>,
    /// Extension steps taken
    pub nodes: usize,
    /// Whether the node budget ran out
    pub exhausted: bool,
}

impl ProbeResult {
    pub fn word_count(&self) -> usize {
        self.found.len()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.found.iter().map(|f| f.word.as_str())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.found.iter().any(|f| f.word == word)
    }

    /// The `count` least-used cells, fewest first; ties break row-major.
    pub fn least_used(&self, size: usize, count: usize) -> Vec<Position> {
        let mut cells: Vec<usize> = (0..self.usage.len()).collect();
        cells.sort_by_key(|&i| (self.usage[i], i));
        cells
            .into_iter()
            .take(count)
            .map(|i| Position::new(i / size, i % size))
            .collect()
    }
}

/// Search `board` for dictionary words.
#[instrument(level = "debug", skip_all, fields(size = board.size()))]
pub fn probe(board: &Board, dictionary: &Dictionary, limits: ProbeLimits) -> ProbeResult {
    let mut search = Search::new(board, dictionary, limits);
    for root in board.positions() {
        if search.visit(root).is_break() {
            break;
        }
    }
    let result = search.finish();
    debug!(
        words = result.word_count(),
        link = result.link_found,
        nodes = result.nodes,
        exhausted = result.exhausted,
        "probe finished"
    );
    result
}

struct Search<'a> {
    board: &'a Board,
    dictionary: &'a Dictionary,
    limits: ProbeLimits,
    visited: Vec<bool>,
    path: Vec<Position>,
    word: String,
    seen: HashSet<String>,
    result: ProbeResult,
}

impl<'a> Search<'a> {
    fn new(board: &'a Board, dictionary: &'a Dictionary, limits: ProbeLimits) -> Self {
        let cells = board.size() * board.size();
        Self {
            board,
            dictionary,
            limits,
            visited: vec![false; cells],
            path: Vec::new(),
            word: String::new(),
            seen: HashSet::new(),
            result: ProbeResult {
                usage: vec![0; cells],
                ..ProbeResult::default()
            },
        }
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.board.size() + pos.col
    }

    fn visit(&mut self, pos: Position) -> ControlFlow<()> {
        self.result.nodes += 1;
        if self.result.nodes > self.limits.node_budget {
            self.result.exhausted = true;
            return ControlFlow::Break(());
        }

        let idx = self.index(pos);
        self.visited[idx] = true;
        self.path.push(pos);
        self.word.push(self.board.get(pos).to_ascii_lowercase());

        let flow = self.step(pos);

        self.word.pop();
        self.path.pop();
        self.visited[idx] = false;
        flow
    }

    fn step(&mut self, pos: Position) -> ControlFlow<()> {
        if self.word.len() >= MIN_WORD_LENGTH
            && !self.seen.contains(&self.word)
            && self.dictionary.contains(&self.word)
        {
            self.record();
            if self.satisfied() {
                return ControlFlow::Break(());
            }
        }

        if !self.dictionary.has_prefix(&self.word) {
            return ControlFlow::Continue(());
        }

        for next in pos.neighbors(self.board.size()) {
            if !self.visited[self.index(next)] {
                self.visit(next)?;
            }
        }
        ControlFlow::Continue(())
    }

    fn record(&mut self) {
        let mut overlaps = false;
        for &pos in &self.path {
            let idx = pos.row * self.board.size() + pos.col;
            overlaps |= self.result.usage[idx] > 0;
            self.result.usage[idx] += 1;
        }
        self.result.link_found |= overlaps;
        self.seen.insert(self.word.clone());
        self.result.found.push(FoundWord {
            word: self.word.clone(),
            path: self.path.clone(),
        });
    }

    fn satisfied(&self) -> bool {
        self.limits
            .target_words
            .is_some_and(|k| self.result.found.len() >= k && self.result.link_found)
    }

    fn finish(self) -> ProbeResult {
        self.result
    }
}

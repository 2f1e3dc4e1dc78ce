//! Game-over detection: is there still a legal word under the chain rule?

use std::collections::BTreeSet;
use std::ops::ControlFlow;
use tracing::{debug, instrument};

use super::board::Board;
use super::dictionary::Dictionary;
use super::prober::FoundWord;
use super::special::SpecialGrid;
use super::{Position, TileSet, MIN_WORD_LENGTH};

/// Result of a move search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    /// A playable word exists; here is one
    Move(FoundWord),
    /// Budget ran out before a word was found; assume the round goes on
    Undecided,
    /// No playable word anywhere
    Dead,
}

impl Liveness {
    pub fn has_move(&self) -> bool {
        !matches!(self, Liveness::Dead)
    }

    pub fn into_move(self) -> Option<FoundWord> {
        match self {
            Liveness::Move(found) => Some(found),
            _ => None,
        }
    }
}

/// What the search may use: the live board, the chain, the words already played.
pub struct MoveSearch<'a> {
    pub board: &'a Board,
    pub specials: &'a SpecialGrid,
    pub dictionary: &'a Dictionary,
    /// Uppercase committed words
    pub used: &'a BTreeSet<String>,
    pub chain: &'a TileSet,
    pub node_budget: usize,
}

impl MoveSearch<'_> {
    /// Depth-first search that stops at the first unused dictionary word
    /// whose path touches the chain (or any word while the chain is empty).
    /// Stones are skipped. A wild cell stands for each letter in turn,
    /// and a path holds at most one of them.
    #[instrument(level = "debug", skip_all, fields(used = self.used.len()))]
    pub fn run(&self) -> Liveness {
        let cells = self.board.size() * self.board.size();
        let mut walk = Walk {
            search: self,
            visited: vec![false; cells],
            path: Vec::new(),
            word: String::new(),
            nodes: 0,
            wild_used: false,
            exhausted: false,
            hit: None,
        };
        for root in self.board.positions() {
            if walk.visit(root, self.chain.is_empty()).is_break() {
                break;
            }
        }
        let liveness = match (walk.hit, walk.exhausted) {
            (Some(found), _) => Liveness::Move(found),
            (None, true) => Liveness::Undecided,
            (None, false) => Liveness::Dead,
        };
        debug!(nodes = walk.nodes, live = liveness.has_move(), "move search finished");
        liveness
    }
}

struct Walk<'s, 'a> {
    search: &'s MoveSearch<'a>,
    visited: Vec<bool>,
    path: Vec<Position>,
    word: String,
    nodes: usize,
    wild_used: bool,
    exhausted: bool,
    hit: Option<FoundWord>,
}

impl Walk<'_, '_> {
    fn visit(&mut self, pos: Position, touched: bool) -> ControlFlow<()> {
        let specials = self.search.specials;
        let wild = specials.is_wild(pos);
        if specials.is_stone(pos) || (wild && self.wild_used) {
            return ControlFlow::Continue(());
        }
        self.nodes += 1;
        if self.nodes > self.search.node_budget {
            self.exhausted = true;
            return ControlFlow::Break(());
        }

        let size = self.search.board.size();
        let idx = pos.row * size + pos.col;
        let touched = touched || self.search.chain.contains(&pos);
        self.visited[idx] = true;
        self.path.push(pos);

        let flow = if wild {
            self.wild_used = true;
            let flow = ('a'..='z').try_for_each(|letter| {
                self.word.push(letter);
                let flow = self.step(pos, touched);
                self.word.pop();
                flow
            });
            self.wild_used = false;
            flow
        } else {
            self.word.push(self.search.board.get(pos).to_ascii_lowercase());
            let flow = self.step(pos, touched);
            self.word.pop();
            flow
        };

        self.path.pop();
        self.visited[idx] = false;
        flow
    }

    fn step(&mut self, pos: Position, touched: bool) -> ControlFlow<()> {
        let dictionary = self.search.dictionary;
        if touched
            && self.word.len() >= MIN_WORD_LENGTH
            && dictionary.contains(&self.word)
            && !self.search.used.contains(&self.word.to_ascii_uppercase())
        {
            self.hit = Some(FoundWord {
                word: self.word.clone(),
                path: self.path.clone(),
            });
            return ControlFlow::Break(());
        }

        if !dictionary.has_prefix(&self.word) {
            return ControlFlow::Continue(());
        }

        let size = self.search.board.size();
        for next in pos.neighbors(size) {
            if !self.visited[next.row * size + next.col] {
                self.visit(next, touched)?;
            }
        }
        ControlFlow::Continue(())
    }
}

//! Round state machine
//!
//! A round is a plain value. Every player input is an [`Action`] fed through
//! [`RoundState::apply`], which hands back the next state and an [`Outcome`]
//! describing what happened. Rejected submissions never touch committed
//! state; they only clear the path under construction.
//!
//! ```text
//! Idle --Begin--> Building --Extend/backtrack--> Building
//!                 Building --Submit--> Idle | WildcardPending
//!          WildcardPending --ResolveWildcard--> Idle
//! ```

use derive_more::{Display, Error, From};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

use super::board::{Board, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use super::dictionary::{Dictionary, DictionaryStatus};
use super::prober::{FoundWord, DEFAULT_NODE_BUDGET};
use super::scoring::{Benchmarks, Grade, ScoreBreakdown, ScoringPolicy};
use super::special::{apply_shuffle, apply_xfactor, SpawnPolicy, SpecialGrid, SpecialKind};
use super::terminal::{Liveness, MoveSearch};
use super::validation::{self, Rejection};
use super::wildcard::{Resolution, WildcardMode};
use super::{Position, TileSet};

/// Engine-wide rules shared by every round.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub scoring: ScoringPolicy,
    pub specials: SpawnPolicy,
    /// Specials start spawning once the score reaches this grade
    pub spawn_threshold: Grade,
    pub external_multiplier: f64,
    /// Node budget for game-over checks and hints
    pub node_budget: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            specials: SpawnPolicy::default(),
            spawn_threshold: Grade::Bronze,
            external_multiplier: 1.0,
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

/// Collaborators a transition may consult.
pub struct Env<'a, R: Rng + ?Sized> {
    pub dictionary: &'a DictionaryStatus,
    pub rules: &'a Rules,
    pub rng: &'a mut R,
}

/// Per-round parameters fixed when the board is handed over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundSetup {
    pub benchmarks: Benchmarks,
    pub discoverable_words: usize,
    pub move_limit: Option<u32>,
    pub wildcard: WildcardMode,
}

/// Player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a new path on a cell
    Begin(Position),
    /// Add a cell to the path, or step back onto the previous one
    Extend(Position),
    Submit,
    /// Letter chosen for a pending wild tile
    ResolveWildcard(char),
    /// Drop the path under construction
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Building {
        path: Vec<Position>,
    },
    WildcardPending {
        path: Vec<Position>,
        wild_index: usize,
    },
}

impl Phase {
    pub fn path(&self) -> &[Position] {
        match self {
            Phase::Idle => &[],
            Phase::Building { path } | Phase::WildcardPending { path, .. } => path,
        }
    }
}

/// A committed word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// Uppercase
    pub word: String,
    pub path: Vec<Position>,
    pub tiles: TileSet,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedWord {
    pub word: String,
    pub reason: Rejection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// No unused word can be traced through the chain
    NoMoves,
    /// Move limit reached
    MoveLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEnd {
    pub reason: EndReason,
    pub score: u64,
    pub grade: Grade,
}

/// Everything a commit changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub record: WordRecord,
    pub breakdown: ScoreBreakdown,
    /// Cells whose letters changed through wild, x-factor or shuffle effects
    pub changed: TileSet,
    pub expired: Vec<Position>,
    pub spawned: Vec<Position>,
    pub end: Option<RoundEnd>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Path started, grown or shortened
    PathChanged,
    /// Input had no effect (bad cell, wrong phase, round over)
    Ignored,
    /// The dictionary is still loading
    NotReady,
    Rejected(Rejection),
    /// Waiting for the player to name the wild letter
    WildcardPending,
    Committed(Box<Commit>),
    Cancelled,
}

/// Result of one transition.
#[derive(Debug, Clone)]
pub struct Step {
    pub state: RoundState,
    pub outcome: Outcome,
}

#[derive(Debug, Display, Error, From)]
pub enum SnapshotError {
    #[display("round snapshot could not be encoded or decoded: {_0}")]
    Json(serde_json::Error),
    #[display("invalid round snapshot: {reason}")]
    #[from(ignore)]
    Invalid { reason: String },
}

/// End-of-round summary
#[derive(Debug, Clone, Default)]
pub struct RoundSummary {
    pub total_score: u64,
    pub moves: u32,
    pub words: Vec<WordRecord>,
    pub best: Option<WordRecord>,
    /// Rejected submissions grouped by reason
    pub rejected: BTreeMap<Rejection, Vec<String>>,
    pub grade: Grade,
    pub end: Option<RoundEnd>,
}

/// A full round: board, specials, path under construction and committed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    board: Board,
    specials: SpecialGrid,
    phase: Phase,
    records: Vec<WordRecord>,
    used: BTreeSet<String>,
    chain: TileSet,
    score: u64,
    streak: u32,
    moves: u32,
    move_limit: Option<u32>,
    wildcard: WildcardMode,
    benchmarks: Benchmarks,
    discoverable_words: usize,
    rejected: Vec<RejectedWord>,
    end: Option<RoundEnd>,
}

impl RoundState {
    pub fn new(board: Board, specials: SpecialGrid, setup: RoundSetup) -> Self {
        Self {
            board,
            specials,
            phase: Phase::Idle,
            records: Vec::new(),
            used: BTreeSet::new(),
            chain: TileSet::new(),
            score: 0,
            streak: 0,
            moves: 0,
            move_limit: setup.move_limit,
            wildcard: setup.wildcard,
            benchmarks: setup.benchmarks,
            discoverable_words: setup.discoverable_words,
            rejected: Vec::new(),
            end: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn specials(&self) -> &SpecialGrid {
        &self.specials
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn path(&self) -> &[Position] {
        self.phase.path()
    }

    /// Letters spelled by the current path.
    pub fn path_word(&self) -> String {
        self.board.spell(self.path())
    }

    pub fn records(&self) -> &[WordRecord] {
        &self.records
    }

    pub fn used(&self) -> &BTreeSet<String> {
        &self.used
    }

    pub fn chain(&self) -> &TileSet {
        &self.chain
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn move_limit(&self) -> Option<u32> {
        self.move_limit
    }

    pub fn wildcard_mode(&self) -> WildcardMode {
        self.wildcard
    }

    pub fn benchmarks(&self) -> &Benchmarks {
        &self.benchmarks
    }

    pub fn discoverable_words(&self) -> usize {
        self.discoverable_words
    }

    pub fn grade(&self) -> Grade {
        self.benchmarks.grade(self.score)
    }

    pub fn end(&self) -> Option<&RoundEnd> {
        self.end.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.end.is_some()
    }

    /// Run one transition.
    pub fn apply<R: Rng + ?Sized>(mut self, action: Action, env: &mut Env<'_, R>) -> Step {
        let outcome = if self.end.is_some() {
            Outcome::Ignored
        } else {
            match action {
                Action::Begin(pos) => self.begin(pos),
                Action::Extend(pos) => self.extend(pos),
                Action::Submit => self.submit(env),
                Action::ResolveWildcard(letter) => self.resolve_wildcard(letter, env),
                Action::Cancel => self.cancel(),
            }
        };
        Step {
            state: self,
            outcome,
        }
    }

    fn begin(&mut self, pos: Position) -> Outcome {
        if !self.board.contains(pos) || matches!(self.phase, Phase::WildcardPending { .. }) {
            return Outcome::Ignored;
        }
        if self.specials.is_stone(pos) {
            return Outcome::Rejected(Rejection::BlockedTile);
        }
        self.phase = Phase::Building { path: vec![pos] };
        Outcome::PathChanged
    }

    fn extend(&mut self, pos: Position) -> Outcome {
        let blocked = self.specials.is_stone(pos);
        let on_board = self.board.contains(pos);
        let Phase::Building { path } = &mut self.phase else {
            return Outcome::Ignored;
        };
        if !on_board {
            return Outcome::Ignored;
        }
        if path.len() >= 2 && path[path.len() - 2] == pos {
            path.pop();
            return Outcome::PathChanged;
        }
        let adjacent = path.last().is_some_and(|last| last.is_adjacent(&pos));
        if !adjacent || path.contains(&pos) {
            return Outcome::Ignored;
        }
        if blocked {
            return Outcome::Rejected(Rejection::BlockedTile);
        }
        path.push(pos);
        Outcome::PathChanged
    }

    fn cancel(&mut self) -> Outcome {
        match std::mem::take(&mut self.phase) {
            Phase::Idle => Outcome::Ignored,
            _ => Outcome::Cancelled,
        }
    }

    fn submit<R: Rng + ?Sized>(&mut self, env: &mut Env<'_, R>) -> Outcome {
        let Phase::Building { path } = &self.phase else {
            return Outcome::Ignored;
        };
        let path = path.clone();
        let word = self.board.spell(&path);

        let status = env.dictionary;
        let dictionary = match status {
            DictionaryStatus::Loading => return Outcome::NotReady,
            DictionaryStatus::Unavailable(_) => {
                return self.reject(word, Rejection::DictionaryUnavailable)
            }
            DictionaryStatus::Ready(dictionary) => dictionary,
        };
        if let Err(reason) = validation::check_length(&path) {
            return self.reject(word, reason);
        }
        let wild_index = match validation::find_wild(&path, &self.specials) {
            Ok(index) => index,
            Err(reason) => return self.reject(word, reason),
        };

        let Some(index) = wild_index else {
            return self.finish(path, None, dictionary, env);
        };
        let letters: Vec<char> = word.chars().collect();
        match self
            .wildcard
            .resolver()
            .resolve(&letters, index, dictionary, &self.used)
        {
            Resolution::Letter(letter) => {
                debug!(%letter, "wildcard resolved automatically");
                self.finish(path, Some((index, letter)), dictionary, env)
            }
            Resolution::Pending => {
                self.phase = Phase::WildcardPending {
                    path,
                    wild_index: index,
                };
                Outcome::WildcardPending
            }
            Resolution::NoMatch => self.reject(word, Rejection::AmbiguousWildcard),
        }
    }

    fn resolve_wildcard<R: Rng + ?Sized>(&mut self, letter: char, env: &mut Env<'_, R>) -> Outcome {
        let Phase::WildcardPending { path, wild_index } = &self.phase else {
            return Outcome::Ignored;
        };
        if !letter.is_ascii_alphabetic() {
            return Outcome::Ignored;
        }
        let (path, index) = (path.clone(), *wild_index);
        let status = env.dictionary;
        let dictionary = match status {
            DictionaryStatus::Loading => return Outcome::NotReady,
            DictionaryStatus::Unavailable(_) => {
                let word = self.board.spell(&path);
                return self.reject(word, Rejection::DictionaryUnavailable);
            }
            DictionaryStatus::Ready(dictionary) => dictionary,
        };
        self.finish(path, Some((index, letter.to_ascii_uppercase())), dictionary, env)
    }

    /// Checks that need the full word, then commit.
    fn finish<R: Rng + ?Sized>(
        &mut self,
        path: Vec<Position>,
        wild: Option<(usize, char)>,
        dictionary: &Dictionary,
        env: &mut Env<'_, R>,
    ) -> Outcome {
        let mut letters: Vec<char> = self.board.spell(&path).chars().collect();
        if let Some((index, letter)) = wild {
            letters[index] = letter;
        }
        let word: String = letters.into_iter().collect();

        if let Err(reason) = validation::validate_resolved(
            &word,
            &path,
            dictionary,
            &self.used,
            &self.specials,
            &self.chain,
        ) {
            return self.reject(word, reason);
        }
        let wild = wild.map(|(index, letter)| (path[index], letter));
        let commit = self.commit(path, word, wild, dictionary, env);
        Outcome::Committed(Box::new(commit))
    }

    fn reject(&mut self, word: String, reason: Rejection) -> Outcome {
        info!(%word, ?reason, "submission rejected");
        self.phase = Phase::Idle;
        self.rejected.push(RejectedWord { word, reason });
        Outcome::Rejected(reason)
    }

    #[instrument(level = "debug", skip_all, fields(word = %word))]
    fn commit<R: Rng + ?Sized>(
        &mut self,
        path: Vec<Position>,
        word: String,
        wild: Option<(Position, char)>,
        dictionary: &Dictionary,
        env: &mut Env<'_, R>,
    ) -> Commit {
        let rules = env.rules;
        let tiles: TileSet = path.iter().collect();
        let shared = tiles.shared_with(&self.chain);
        let streak = rules.scoring.next_streak(self.streak, word.len());
        let multipliers: Vec<u32> = path
            .iter()
            .filter_map(|&p| match self.specials.kind(p) {
                Some(SpecialKind::Multiplier(value)) => Some(value),
                _ => None,
            })
            .collect();
        let breakdown = rules.scoring.score(
            &word,
            shared,
            streak,
            &multipliers,
            rules.external_multiplier,
        );

        let record = WordRecord {
            word: word.clone(),
            path: path.clone(),
            tiles: tiles.clone(),
            score: breakdown.total,
        };
        self.records.push(record.clone());
        self.used.insert(word);
        self.moves += 1;
        self.score += breakdown.total;
        self.streak = streak;
        self.chain = tiles;
        self.phase = Phase::Idle;

        let mut changed = TileSet::new();
        if let Some((pos, letter)) = wild {
            self.board.set(pos, letter);
            changed.insert(pos);
        }
        for &pos in &path {
            let Some(tile) = self.specials.clear(pos) else {
                continue;
            };
            match tile.kind {
                SpecialKind::XFactor => {
                    changed.extend(apply_xfactor(&mut self.board, &mut self.specials, pos, env.rng));
                }
                SpecialKind::Shuffle => {
                    changed.extend(apply_shuffle(&mut self.board, env.rng));
                }
                _ => {}
            }
        }

        let expired = self.specials.tick_expiry();
        let spawned = if self.score >= self.benchmarks.threshold(rules.spawn_threshold) {
            self.specials.spawn(&rules.specials, env.rng)
        } else {
            Vec::new()
        };

        info!(
            word = %record.word,
            points = record.score,
            total = self.score,
            streak = self.streak,
            "word committed"
        );

        let end = self.check_terminal(dictionary, rules.node_budget).copied();
        Commit {
            record,
            breakdown,
            changed,
            expired,
            spawned,
            end,
        }
    }

    /// End the round if the move cap is reached or no legal word remains.
    /// Run after every commit and once when the round starts.
    pub fn check_terminal(&mut self, dictionary: &Dictionary, node_budget: usize) -> Option<&RoundEnd> {
        if self.end.is_none() {
            let reason = if self.move_limit.is_some_and(|limit| self.moves >= limit) {
                Some(EndReason::MoveLimit)
            } else {
                match self.move_search(dictionary, node_budget).run() {
                    Liveness::Dead => Some(EndReason::NoMoves),
                    _ => None,
                }
            };
            if let Some(reason) = reason {
                let end = RoundEnd {
                    reason,
                    score: self.score,
                    grade: self.grade(),
                };
                info!(?reason, score = end.score, grade = %end.grade, "round over");
                self.end = Some(end);
            }
        }
        self.end.as_ref()
    }

    /// A playable word and its path, if one can be found within the budget.
    pub fn hint(&self, dictionary: &Dictionary, node_budget: usize) -> Option<FoundWord> {
        if self.is_over() {
            return None;
        }
        self.move_search(dictionary, node_budget).run().into_move()
    }

    fn move_search<'a>(&'a self, dictionary: &'a Dictionary, node_budget: usize) -> MoveSearch<'a> {
        MoveSearch {
            board: &self.board,
            specials: &self.specials,
            dictionary,
            used: &self.used,
            chain: &self.chain,
            node_budget,
        }
    }

    pub fn summary(&self) -> RoundSummary {
        let mut rejected: BTreeMap<Rejection, Vec<String>> = BTreeMap::new();
        for miss in &self.rejected {
            rejected.entry(miss.reason).or_default().push(miss.word.clone());
        }
        RoundSummary {
            total_score: self.score,
            moves: self.moves,
            words: self.records.clone(),
            best: self.records.iter().max_by_key(|r| r.score).cloned(),
            rejected,
            grade: self.grade(),
            end: self.end,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a snapshot, refusing grids that could not have come from a round.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let state: Self = serde_json::from_str(json)?;
        state.check_shape().map_err(|reason| SnapshotError::Invalid { reason })?;
        Ok(state)
    }

    fn check_shape(&self) -> Result<(), String> {
        let size = self.board.size();
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(format!("board size {} out of range", size));
        }
        if self.board.letters().len() != size * size {
            return Err(format!("board holds {} cells, expected {}", self.board.letters().len(), size * size));
        }
        if let Some(bad) = self.board.letters().iter().find(|c| !c.is_ascii_uppercase()) {
            return Err(format!("board letter {:?} is not A-Z", bad));
        }
        if !self.specials.fits(size) {
            return Err(format!("special tiles do not cover a {}x{} board", size, size));
        }
        let path = self.phase.path();
        if let Some(pos) = path.iter().chain(self.chain.iter()).find(|&&pos| !self.board.contains(pos)) {
            return Err(format!("cell {} is off the board", pos));
        }
        if let Phase::WildcardPending { wild_index, .. } = self.phase {
            if wild_index >= path.len() {
                return Err(format!("wild index {} is outside the path", wild_index));
            }
        }
        Ok(())
    }
}

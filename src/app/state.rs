//! Playing-screen state: the round plus cursor, feedback and hint

use rand_chacha::ChaCha8Rng;

use crate::game::dictionary::DictionaryStatus;
use crate::game::prober::FoundWord;
use crate::game::round::{Action, Env, Outcome, Phase, RoundState, RoundSummary, Rules, Step};
use crate::game::Position;

/// Tone of the feedback line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Info,
    Good,
    Warn,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    pub text: String,
    pub tone: Tone,
}

impl Feedback {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

/// Main application state while a round is on screen
pub struct App {
    round: RoundState,
    dictionary: DictionaryStatus,
    rules: Rules,
    rng: ChaCha8Rng,
    /// Highlighted cell
    pub cursor: Position,
    /// Message from the last input
    pub feedback: Feedback,
    hint: Option<FoundWord>,
}

impl App {
    pub fn new(round: RoundState, dictionary: DictionaryStatus, rules: Rules, rng: ChaCha8Rng) -> Self {
        let feedback = match round.end() {
            Some(_) => Feedback::new("No playable words on this board", Tone::Warn),
            None => Feedback::default(),
        };
        Self {
            round,
            dictionary,
            rules,
            rng,
            cursor: Position::new(0, 0),
            feedback,
            hint: None,
        }
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn dictionary(&self) -> &DictionaryStatus {
        &self.dictionary
    }

    pub fn hint(&self) -> Option<&FoundWord> {
        self.hint.as_ref()
    }

    pub fn is_round_over(&self) -> bool {
        self.round.is_over()
    }

    pub fn is_wildcard_pending(&self) -> bool {
        matches!(self.round.phase(), Phase::WildcardPending { .. })
    }

    pub fn summary(&self) -> RoundSummary {
        self.round.summary()
    }

    /// Swap in a newly loaded (or failed) dictionary.
    pub fn set_dictionary(&mut self, status: DictionaryStatus) {
        self.dictionary = status;
    }

    /// Show a message without any round input.
    pub fn notify(&mut self, text: impl Into<String>, tone: Tone) {
        self.feedback = Feedback::new(text, tone);
    }

    pub fn on_move(&mut self, direction: Move) {
        let last = self.round.board().size().saturating_sub(1);
        let Position { row, col } = self.cursor;
        self.cursor = match direction {
            Move::Up => Position::new(row.saturating_sub(1), col),
            Move::Down => Position::new((row + 1).min(last), col),
            Move::Left => Position::new(row, col.saturating_sub(1)),
            Move::Right => Position::new(row, (col + 1).min(last)),
        };
    }

    /// Put the cursor on `pos`, clamped to the board.
    pub fn move_to(&mut self, pos: Position) {
        let last = self.round.board().size().saturating_sub(1);
        self.cursor = Position::new(pos.row.min(last), pos.col.min(last));
    }

    /// Select the cell under the cursor: start a path, extend it, or step back.
    /// Tapping a cell that cannot extend the path starts a new one there.
    pub fn on_tap(&mut self) {
        let cursor = self.cursor;
        match self.round.phase() {
            Phase::Idle => {
                self.step(Action::Begin(cursor));
            }
            Phase::Building { path } => {
                let restart = !path.contains(&cursor);
                if self.step(Action::Extend(cursor)) == Outcome::Ignored && restart {
                    self.step(Action::Begin(cursor));
                }
            }
            Phase::WildcardPending { .. } => {}
        }
    }

    pub fn on_submit(&mut self) {
        self.step(Action::Submit);
    }

    pub fn on_cancel(&mut self) {
        self.step(Action::Cancel);
    }

    /// Letter typed while a wild tile waits for its letter
    pub fn on_letter(&mut self, letter: char) {
        if self.is_wildcard_pending() {
            self.step(Action::ResolveWildcard(letter.to_ascii_uppercase()));
        }
    }

    /// Look up a playable word and show it.
    pub fn on_hint(&mut self) {
        if self.is_round_over() {
            return;
        }
        let Some(dictionary) = self.dictionary.ready() else {
            self.feedback = Feedback::new("Dictionary still loading", Tone::Warn);
            return;
        };
        self.hint = self.round.hint(dictionary, self.rules.node_budget);
        self.feedback = match &self.hint {
            Some(found) => Feedback::new(format!("Try {}", found.word.to_uppercase()), Tone::Info),
            None => Feedback::new("No hint found", Tone::Warn),
        };
    }

    fn step(&mut self, action: Action) -> Outcome {
        let mut env = Env {
            dictionary: &self.dictionary,
            rules: &self.rules,
            rng: &mut self.rng,
        };
        let Step { state, outcome } = self.round.clone().apply(action, &mut env);
        self.round = state;
        self.report(&outcome);
        outcome
    }

    fn report(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Ignored => {}
            Outcome::PathChanged | Outcome::Cancelled => self.feedback = Feedback::default(),
            Outcome::NotReady => {
                self.feedback = Feedback::new("Dictionary still loading", Tone::Warn);
            }
            Outcome::Rejected(reason) => {
                self.feedback = Feedback::new(reason.message(), Tone::Bad);
            }
            Outcome::WildcardPending => {
                self.feedback = Feedback::new("Type a letter for the wild tile", Tone::Info);
            }
            Outcome::Committed(commit) => {
                self.hint = None;
                let record = &commit.record;
                self.feedback = match &commit.end {
                    Some(end) => Feedback::new(
                        format!("OK +{} ({}) - round over, {}", record.score, record.word, end.grade),
                        Tone::Good,
                    ),
                    None => Feedback::new(format!("OK +{} ({})", record.score, record.word), Tone::Good),
                };
            }
        }
    }
}

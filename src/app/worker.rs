//! Background work: dictionary loading and board generation
//!
//! Both run on their own threads and report back over a channel. Each board
//! request gets a generation number; starting a new one cancels the previous
//! refiner and any result that still arrives for an old generation is dropped.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::game::dictionary::{Dictionary, DictionaryStatus};
use crate::game::prober::{probe, ProbeLimits};
use crate::game::refiner::refine;
use crate::game::round::{RoundSetup, RoundState};
use crate::game::sampler::seeded_rng;
use crate::game::scoring::Benchmarker;
use crate::game::special::SpecialGrid;

/// Message from a background thread.
#[derive(Debug)]
pub enum WorkerEvent {
    DictionaryLoaded(DictionaryStatus),
    RoundReady {
        generation: u64,
        round: Box<RoundState>,
        /// False when the board is a best-effort fallback
        satisfied: bool,
    },
}

/// A fresh round plus how the refiner fared.
#[derive(Debug, Clone)]
pub struct PreparedRound {
    pub round: RoundState,
    pub satisfied: bool,
}

/// Generate a board, size up its word count, and open a round on it.
///
/// A daily seed fixes both the board and the move limit. Returns `None` if
/// `cancel` is raised first.
pub fn prepare_round(
    dictionary: &Dictionary,
    config: &EngineConfig,
    daily_seed: Option<&str>,
    cancel: &AtomicBool,
) -> Option<PreparedRound> {
    let mut rng = match daily_seed {
        Some(seed) => seeded_rng(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };
    let size = config.board.size;
    let refined = refine(dictionary, size, &config.generation, &mut rng, cancel)?;

    let full = probe(
        &refined.board,
        dictionary,
        ProbeLimits {
            node_budget: config.generation.node_budget,
            target_words: None,
        },
    );
    let discoverable_words = full.word_count();
    let benchmarks = config
        .benchmarks
        .compute(discoverable_words, config.generation.min_words);

    let setup = RoundSetup {
        benchmarks,
        discoverable_words,
        move_limit: config.move_limit(daily_seed),
        wildcard: config.play.wildcard,
    };
    let mut round = RoundState::new(refined.board, SpecialGrid::new(size), setup);
    round.check_terminal(dictionary, config.play.node_budget);
    info!(
        discoverable_words,
        satisfied = refined.satisfied,
        daily = daily_seed.is_some(),
        "round prepared"
    );
    Some(PreparedRound {
        round,
        satisfied: refined.satisfied,
    })
}

/// Owner of the background threads and their channel.
pub struct Worker {
    tx: Sender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,
    generation: u64,
    cancel: Arc<AtomicBool>,
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            generation: 0,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Generation number of the latest board request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Load the word list at `path`, or the embedded one.
    pub fn load_dictionary(&self, path: Option<PathBuf>) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let status = match path {
                Some(path) => {
                    let status = DictionaryStatus::from(Dictionary::from_file(&path));
                    if let DictionaryStatus::Unavailable(reason) = &status {
                        warn!(path = %path.display(), %reason, "dictionary load failed");
                    }
                    status
                }
                None => DictionaryStatus::Ready(Dictionary::embedded()),
            };
            let _ = tx.send(WorkerEvent::DictionaryLoaded(status));
        });
    }

    /// Start generating a board, superseding any request still running.
    pub fn generate(
        &mut self,
        dictionary: Arc<Dictionary>,
        config: EngineConfig,
        daily_seed: Option<String>,
    ) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Arc::clone(&cancel);
        let tx = self.tx.clone();

        debug!(generation, "board generation started");
        thread::spawn(move || {
            if let Some(prepared) =
                prepare_round(&dictionary, &config, daily_seed.as_deref(), &cancel)
            {
                let _ = tx.send(WorkerEvent::RoundReady {
                    generation,
                    round: Box::new(prepared.round),
                    satisfied: prepared.satisfied,
                });
            }
        });
        generation
    }

    /// Stop the running board request, if any.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Drain pending events, dropping boards from superseded requests.
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(WorkerEvent::RoundReady { generation, .. }) if generation != self.generation => {
                    debug!(generation, current = self.generation, "stale board discarded");
                }
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

//! Application screen state management
//!
//! Handles transitions between the application screens:
//! - Loading the dictionary
//! - Generating a board
//! - Playing a round (the end-of-round summary is drawn over it)
//! - Error message display

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::game::dictionary::{Dictionary, DictionaryStatus};
use crate::game::round::Rules;
use crate::game::sampler::seeded_rng;

use super::state::{App, Tone};
use super::worker::{Worker, WorkerEvent};

/// The current application screen
pub enum Screen {
    /// Waiting for the word list
    Loading,
    /// Waiting for the background refiner
    Generating { generation: u64 },
    /// Playing a round
    Playing { app: Box<App> },
    /// Unrecoverable problem, such as a word list that would not load
    Error { message: String },
}

/// Main application coordinator
pub struct AppCoordinator {
    /// Current screen
    pub screen: Screen,
    /// Whether the application should quit
    pub should_quit: bool,
    config: EngineConfig,
    rules: Rules,
    daily_seed: Option<String>,
    dictionary: DictionaryStatus,
    worker: Worker,
}

impl AppCoordinator {
    /// Start loading the dictionary; a board is requested once it arrives.
    pub fn new(config: EngineConfig, daily_seed: Option<String>) -> Self {
        let worker = Worker::new();
        worker.load_dictionary(config.play.dictionary.clone());
        Self {
            screen: Screen::Loading,
            should_quit: false,
            rules: config.rules(),
            config,
            daily_seed,
            dictionary: DictionaryStatus::Loading,
            worker,
        }
    }

    pub fn daily_seed(&self) -> Option<&str> {
        self.daily_seed.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.worker.cancel();
        self.should_quit = true;
    }

    /// Throw away the current round and generate a new board.
    pub fn new_round(&mut self) {
        let DictionaryStatus::Ready(dictionary) = &self.dictionary else {
            return;
        };
        let generation = self.worker.generate(
            Arc::clone(dictionary),
            self.config.clone(),
            self.daily_seed.clone(),
        );
        info!(generation, "new round requested");
        self.screen = Screen::Generating { generation };
    }

    /// Apply whatever the background threads have finished (call regularly)
    pub fn poll(&mut self) {
        for event in self.worker.poll() {
            match event {
                WorkerEvent::DictionaryLoaded(status) => self.on_dictionary(status),
                WorkerEvent::RoundReady {
                    round, satisfied, ..
                } => {
                    let mut app = App::new(
                        *round,
                        self.dictionary.clone(),
                        self.rules.clone(),
                        self.specials_rng(),
                    );
                    if !satisfied && !app.is_round_over() {
                        app.notify("Sparse board: no better one found (n for a new board)", Tone::Warn);
                    }
                    self.screen = Screen::Playing { app: Box::new(app) };
                }
            }
        }
    }

    fn on_dictionary(&mut self, status: DictionaryStatus) {
        self.dictionary = status.clone();
        if let Screen::Playing { app } = &mut self.screen {
            app.set_dictionary(status.clone());
        }
        match status {
            DictionaryStatus::Ready(dictionary) => {
                info!(words = dictionary.len(), "dictionary ready");
                if matches!(self.screen, Screen::Loading) {
                    self.new_round();
                }
            }
            DictionaryStatus::Unavailable(reason) => {
                warn!(%reason, "dictionary unavailable");
                self.screen = Screen::Error {
                    message: format!("Dictionary unavailable: {}", reason),
                };
            }
            DictionaryStatus::Loading => {}
        }
    }

    /// Load the configured word list again after a failed load.
    pub fn retry_dictionary(&mut self) {
        if matches!(self.dictionary, DictionaryStatus::Unavailable(_)) {
            info!(path = ?self.config.play.dictionary, "retrying dictionary load");
            self.dictionary = DictionaryStatus::Loading;
            self.screen = Screen::Loading;
            self.worker.load_dictionary(self.config.play.dictionary.clone());
        }
    }

    /// Fall back to the built-in word list after a failed load.
    pub fn use_embedded_dictionary(&mut self) {
        if matches!(self.dictionary, DictionaryStatus::Unavailable(_)) {
            self.config.play.dictionary = None;
            self.dictionary = DictionaryStatus::Ready(Dictionary::embedded());
            self.new_round();
        }
    }

    fn specials_rng(&self) -> ChaCha8Rng {
        match &self.daily_seed {
            Some(seed) => seeded_rng(&format!("{}#specials", seed)),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

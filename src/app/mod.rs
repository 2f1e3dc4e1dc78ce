//! Application state, screens and background work

pub mod screen;
pub mod state;
pub mod worker;

pub use screen::{AppCoordinator, Screen};
pub use state::{App, Feedback, Move, Tone};
pub use worker::{prepare_round, PreparedRound, Worker, WorkerEvent};

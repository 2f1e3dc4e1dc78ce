//! Board refiner: generate, probe, mutate until the board is worth playing
//!
//! A board is accepted once the prober finds at least `min_words` words and
//! two of them share a tile. Failing that, the least-used tiles are re-rolled
//! (leaning toward vowels or consonants to pull the vowel ratio into its
//! band) and the board is probed again. After `mutation_rounds` the candidate
//! is dropped for a fresh one; after `max_attempts` candidates the last one is
//! returned as a best effort.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};

use super::board::Board;
use super::dictionary::Dictionary;
use super::is_vowel;
use super::prober::{probe, ProbeLimits, ProbeResult, DEFAULT_NODE_BUDGET};
use super::sampler::ConstrainedSampler;

/// Tuning for board generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Cap letters at four copies and fix stranded Qs
    pub constrained: bool,
    pub min_words: usize,
    pub vowel_min: f64,
    pub vowel_max: f64,
    pub mutation_rounds: usize,
    pub respawn_count: usize,
    pub max_attempts: usize,
    pub node_budget: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            constrained: true,
            min_words: 12,
            vowel_min: 0.35,
            vowel_max: 0.55,
            mutation_rounds: 6,
            respawn_count: 3,
            max_attempts: 12,
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

/// An accepted (or best-effort) board.
#[derive(Debug, Clone)]
pub struct Refined {
    pub board: Board,
    pub probe: ProbeResult,
    /// Candidates generated, including the returned one
    pub attempts: usize,
    /// Mutation rounds across all candidates
    pub mutations: usize,
    /// False when the thresholds were never met
    pub satisfied: bool,
}

/// Produce a board for play. Returns `None` only if `cancel` is raised.
#[instrument(skip_all, fields(size = size, min_words = settings.min_words))]
pub fn refine<R: Rng + ?Sized>(
    dictionary: &Dictionary,
    size: usize,
    settings: &GenerationSettings,
    rng: &mut R,
    cancel: &AtomicBool,
) -> Option<Refined> {
    let limits = ProbeLimits {
        node_budget: settings.node_budget,
        target_words: Some(settings.min_words),
    };
    let accept = |result: &ProbeResult| {
        result.word_count() >= settings.min_words && result.link_found
    };
    let cancelled = || cancel.load(Ordering::Relaxed);

    let mut mutations = 0;
    let mut last: Option<(Board, ProbeResult)> = None;

    for attempt in 1..=settings.max_attempts.max(1) {
        if cancelled() {
            debug!(attempt, "refinement cancelled");
            return None;
        }
        let mut board = if settings.constrained {
            Board::generate_constrained(size, rng)
        } else {
            Board::generate(size, rng)
        };
        let mut result = probe(&board, dictionary, limits);

        for round in 0..=settings.mutation_rounds {
            if accept(&result) {
                info!(
                    attempt,
                    mutations,
                    words = result.word_count(),
                    "board accepted"
                );
                return Some(Refined {
                    board,
                    probe: result,
                    attempts: attempt,
                    mutations,
                    satisfied: true,
                });
            }
            if round == settings.mutation_rounds || cancelled() {
                break;
            }
            mutate(&mut board, &result, settings, rng);
            mutations += 1;
            result = probe(&board, dictionary, limits);
        }
        debug!(attempt, words = result.word_count(), "candidate rejected");
        last = Some((board, result));
    }

    if cancelled() {
        return None;
    }
    let (board, probe) = last?;
    warn!(
        words = probe.word_count(),
        link = probe.link_found,
        "no board met the thresholds; using best effort"
    );
    Some(Refined {
        board,
        probe,
        attempts: settings.max_attempts.max(1),
        mutations,
        satisfied: false,
    })
}

/// Re-roll the least-used tiles, nudging the vowel ratio toward its band.
fn mutate<R: Rng + ?Sized>(
    board: &mut Board,
    result: &ProbeResult,
    settings: &GenerationSettings,
    rng: &mut R,
) {
    let mut sampler = ConstrainedSampler::from_letters(board.letters().iter().copied());
    for pos in result.least_used(board.size(), settings.respawn_count) {
        let old = board.get(pos);
        sampler.release(old);
        let ratio = board.vowel_ratio();
        let letter = if ratio < settings.vowel_min {
            sampler.draw_class(rng, true)
        } else if ratio > settings.vowel_max {
            sampler.draw_class(rng, false)
        } else {
            sampler.draw(rng)
        };
        board.set(pos, letter);
        debug!(%pos, from = %old, to = %letter, vowel = is_vowel(letter), "tile re-rolled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sampler::seeded_rng;
    use crate::game::MAX_LETTER_COUNT;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn never() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn test_seeded_boards_meet_thresholds() {
        let dictionary = Dictionary::embedded();
        let settings = GenerationSettings::default();
        let mut satisfied = 0;
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let refined = refine(&dictionary, 4, &settings, &mut rng, &never()).unwrap();
            if refined.satisfied {
                satisfied += 1;
                let full = probe(&refined.board, &dictionary, ProbeLimits::unbounded());
                assert!(full.word_count() >= 12);
                assert!(full.link_found);
            }
            for letter in 'A'..='Z' {
                assert!(refined.board.count(letter) <= MAX_LETTER_COUNT);
            }
        }
        assert!(satisfied >= 18, "only {} of 20 boards satisfied", satisfied);
    }

    #[test]
    fn test_same_seed_same_board() {
        let dictionary = Dictionary::embedded();
        let settings = GenerationSettings::default();
        let a = refine(&dictionary, 4, &settings, &mut seeded_rng("2024-03-09"), &never()).unwrap();
        let b = refine(&dictionary, 4, &settings, &mut seeded_rng("2024-03-09"), &never()).unwrap();
        assert_eq!(a.board, b.board);
        assert_eq!(a.probe.word_count(), b.probe.word_count());
    }

    #[test]
    fn test_best_effort_when_unsatisfiable() {
        let dictionary = Dictionary::from_text("qqq\n").unwrap();
        let settings = GenerationSettings {
            max_attempts: 3,
            mutation_rounds: 2,
            ..GenerationSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let refined = refine(&dictionary, 4, &settings, &mut rng, &never()).unwrap();
        assert!(!refined.satisfied);
        assert_eq!(refined.attempts, 3);
        assert_eq!(refined.mutations, 6);
        assert_eq!(refined.board.size(), 4);
    }

    #[test]
    fn test_cancel_returns_none() {
        let dictionary = Dictionary::embedded();
        let cancel = AtomicBool::new(true);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(refine(&dictionary, 4, &GenerationSettings::default(), &mut rng, &cancel).is_none());
    }

    #[test]
    fn test_mutation_pulls_vowels_into_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut board = Board::from_rows(&["BCDF", "GHJK", "LMNP", "RSTV"]).unwrap();
        let result = ProbeResult {
            usage: vec![0; 16],
            ..ProbeResult::default()
        };
        let settings = GenerationSettings {
            respawn_count: 4,
            ..GenerationSettings::default()
        };
        mutate(&mut board, &result, &settings, &mut rng);
        assert_eq!(board.vowel_ratio(), 4.0 / 16.0);
        assert!("AEIOU".contains(board.get(crate::game::Position::new(0, 0))));
    }
}

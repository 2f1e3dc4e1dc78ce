//! Frequency-weighted letter sampling
//!
//! Three flavours share one frequency table:
//! - plain draws from any RNG ([`sample_letter`]),
//! - reproducible draws from a string seed ([`seeded_rng`]),
//! - capped draws that keep any letter from appearing more than
//!   [`MAX_LETTER_COUNT`] times on a board ([`ConstrainedSampler`]).

use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::{is_vowel, letter_index, LETTER_FREQUENCIES, MAX_LETTER_COUNT};

/// Re-draws attempted before falling back to the least-used legal letter.
const MAX_RETRIES: usize = 12;

/// Letter returned when floating error walks off the end of the table.
const FALLBACK_LETTER: char = 'E';

/// 32-bit multiplicative string hash (`h = h*31 + c`) with a final avalanche.
pub fn seed_hash(seed: &str) -> u32 {
    let hash = seed
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32));
    avalanche(hash)
}

fn avalanche(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Deterministic RNG for a string seed such as a calendar date.
pub fn seeded_rng(seed: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed_hash(seed) as u64)
}

/// Draw one letter from the full English frequency table.
pub fn sample_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    sample_from(&LETTER_FREQUENCIES, rng)
}

/// Walk a frequency table: pick `x` in `[0, total)` and subtract weights
/// until the remainder goes non-positive.
pub fn sample_from<R: Rng + ?Sized>(table: &[(char, f64)], rng: &mut R) -> char {
    let total: f64 = table.iter().map(|(_, f)| f).sum();
    if total <= 0.0 {
        return FALLBACK_LETTER;
    }
    let mut x = rng.random::<f64>() * total;
    for &(letter, freq) in table {
        x -= freq;
        if x <= 0.0 {
            return letter;
        }
    }
    FALLBACK_LETTER
}

/// Letter sampler that tracks how many of each letter are on the board.
#[derive(Debug, Clone)]
pub struct ConstrainedSampler {
    counts: [usize; 26],
    cap: usize,
}

impl Default for ConstrainedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstrainedSampler {
    /// Empty board, default cap.
    pub fn new() -> Self {
        Self {
            counts: [0; 26],
            cap: MAX_LETTER_COUNT,
        }
    }

    /// Seed the counts from letters already on the board.
    pub fn from_letters<I: IntoIterator<Item = char>>(letters: I) -> Self {
        let mut sampler = Self::new();
        for letter in letters {
            sampler.counts[letter_index(letter)] += 1;
        }
        sampler
    }

    pub fn count(&self, letter: char) -> usize {
        self.counts[letter_index(letter)]
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    fn is_legal(&self, letter: char, exclude: &[char]) -> bool {
        self.count(letter) < self.cap && !exclude.contains(&letter)
    }

    /// Forget one occurrence, e.g. when a cell is about to be overwritten.
    pub fn release(&mut self, letter: char) {
        let idx = letter_index(letter);
        self.counts[idx] = self.counts[idx].saturating_sub(1);
    }

    /// Count `letter` if it is still under the cap.
    pub fn admit(&mut self, letter: char) -> bool {
        if self.count(letter) < self.cap {
            self.take(letter);
            true
        } else {
            false
        }
    }

    fn take(&mut self, letter: char) -> char {
        self.counts[letter_index(letter)] += 1;
        letter
    }

    /// Draw a letter that is still under the cap.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> char {
        self.draw_excluding(rng, &[])
    }

    /// Draw a letter under the cap that is not in `exclude`.
    pub fn draw_excluding<R: Rng + ?Sized>(&mut self, rng: &mut R, exclude: &[char]) -> char {
        for _ in 0..MAX_RETRIES {
            let letter = sample_letter(rng);
            if self.is_legal(letter, exclude) {
                return self.take(letter);
            }
        }
        let letter = self.least_used(exclude);
        self.take(letter)
    }

    /// Draw only vowels (or only consonants), weighted by frequency.
    pub fn draw_class<R: Rng + ?Sized>(&mut self, rng: &mut R, vowels: bool) -> char {
        let candidates: Vec<(char, f64)> = LETTER_FREQUENCIES
            .iter()
            .copied()
            .filter(|&(letter, _)| is_vowel(letter) == vowels && self.is_legal(letter, &[]))
            .collect();
        match WeightedIndex::new(candidates.iter().map(|(_, f)| *f)) {
            Ok(dist) => {
                let letter = candidates[dist.sample(rng)].0;
                self.take(letter)
            }
            Err(_) => self.draw(rng),
        }
    }

    /// Lowest-count legal letter; ties go to the more frequent letter.
    fn least_used(&self, exclude: &[char]) -> char {
        LETTER_FREQUENCIES
            .iter()
            .filter(|&&(letter, _)| self.is_legal(letter, exclude))
            .min_by(|a, b| {
                self.count(a.0)
                    .cmp(&self.count(b.0))
                    .then(b.1.total_cmp(&a.1))
            })
            .map(|&(letter, _)| letter)
            .unwrap_or(FALLBACK_LETTER)
    }
}

//! Word scoring, streaks and end-of-round grades
//!
//! A committed word scores
//!
//! ```text
//! total = round((base + rarity + chain + link) × Π multiplier tiles × external)
//! ```
//!
//! where `base = length_factor · len²`, `rarity` sums per-letter rarity
//! classes (plus a flat bonus for each J, Q, X or Z), `link` pays per tile
//! shared with the previous word and `chain` grows with the streak up to a cap.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::letter_index;

/// Rarity class per letter, A..Z. 0 = common, 3 = ultra rare.
const RARITY_CLASSES: [u32; 26] = [
    0, 2, 1, 1, 0, 2, 1, 1, 0, 3, 2, 1, 1, // A-M
    0, 0, 1, 3, 0, 0, 0, 1, 2, 2, 3, 2, 3, // N-Z
];

const ULTRA_RARE: [char; 4] = ['J', 'Q', 'X', 'Z'];

/// Rarity class of an uppercase letter.
pub fn rarity_class(letter: char) -> u32 {
    RARITY_CLASSES[letter_index(letter)]
}

/// Scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub length_factor: f64,
    pub rarity_multiplier: f64,
    pub ultra_rare_bonus: f64,
    pub link_bonus_per_tile: f64,
    /// Words at least this long extend the streak; shorter ones reset it
    pub streak_target_len: usize,
    pub chain_bonus_step: f64,
    pub chain_bonus_cap: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            length_factor: 1.0,
            rarity_multiplier: 2.0,
            ultra_rare_bonus: 5.0,
            link_bonus_per_tile: 2.0,
            streak_target_len: 5,
            chain_bonus_step: 3.0,
            chain_bonus_cap: 15.0,
        }
    }
}

/// The parts of one word's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub rarity: f64,
    pub link: f64,
    pub chain: f64,
    pub multiplier: f64,
    pub total: u64,
}

impl ScoringPolicy {
    pub fn base(&self, len: usize) -> f64 {
        self.length_factor * (len * len) as f64
    }

    pub fn rarity(&self, word: &str) -> f64 {
        word.chars()
            .map(|c| {
                let c = c.to_ascii_uppercase();
                let bonus = if ULTRA_RARE.contains(&c) {
                    self.ultra_rare_bonus
                } else {
                    0.0
                };
                rarity_class(c) as f64 * self.rarity_multiplier + bonus
            })
            .sum()
    }

    pub fn link(&self, shared_tiles: usize) -> f64 {
        self.link_bonus_per_tile * shared_tiles as f64
    }

    /// Streak after a word of length `len`.
    pub fn next_streak(&self, streak: u32, len: usize) -> u32 {
        if len >= self.streak_target_len {
            streak + 1
        } else {
            0
        }
    }

    /// Non-decreasing, capped bonus for a streak.
    pub fn chain(&self, streak: u32) -> f64 {
        (self.chain_bonus_step * streak as f64).min(self.chain_bonus_cap)
    }

    /// Score a committed word. `streak` is the streak after this word.
    pub fn score(
        &self,
        word: &str,
        shared_tiles: usize,
        streak: u32,
        multipliers: &[u32],
        external: f64,
    ) -> ScoreBreakdown {
        let base = self.base(word.len());
        let rarity = self.rarity(word);
        let link = self.link(shared_tiles);
        let chain = self.chain(streak);
        let multiplier = multipliers.iter().map(|&m| m as f64).product::<f64>() * external;
        let total = ((base + rarity + chain + link) * multiplier).round().max(0.0) as u64;
        ScoreBreakdown {
            base,
            rarity,
            link,
            chain,
            multiplier,
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    #[default]
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::None => "-",
            Grade::Bronze => "Bronze",
            Grade::Silver => "Silver",
            Grade::Gold => "Gold",
            Grade::Platinum => "Platinum",
        };
        write!(f, "{}", label)
    }
}

/// Score thresholds for each grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Benchmarks {
    pub bronze: u64,
    pub silver: u64,
    pub gold: u64,
    pub platinum: u64,
}

impl Benchmarks {
    pub fn grade(&self, score: u64) -> Grade {
        if score >= self.platinum {
            Grade::Platinum
        } else if score >= self.gold {
            Grade::Gold
        } else if score >= self.silver {
            Grade::Silver
        } else if score >= self.bronze {
            Grade::Bronze
        } else {
            Grade::None
        }
    }

    pub fn threshold(&self, grade: Grade) -> u64 {
        match grade {
            Grade::None => 0,
            Grade::Bronze => self.bronze,
            Grade::Silver => self.silver,
            Grade::Gold => self.gold,
            Grade::Platinum => self.platinum,
        }
    }
}

/// Turns a board's discoverable word count into grade thresholds.
pub trait Benchmarker: Send + Sync {
    fn compute(&self, discoverable_words: usize, min_words_baseline: usize) -> Benchmarks;
}

/// Thresholds as fixed fractions of `points_per_word × max(words, baseline)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaledBenchmarks {
    pub points_per_word: f64,
}

impl Default for ScaledBenchmarks {
    fn default() -> Self {
        Self {
            points_per_word: 12.0,
        }
    }
}

impl Benchmarker for ScaledBenchmarks {
    fn compute(&self, discoverable_words: usize, min_words_baseline: usize) -> Benchmarks {
        let reference = self.points_per_word * discoverable_words.max(min_words_baseline) as f64;
        let at = |fraction: f64| (reference * fraction).round().max(1.0) as u64;
        Benchmarks {
            bronze: at(0.10),
            silver: at(0.25),
            gold: at(0.45),
            platinum: at(0.70),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_is_quadratic() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.base(3), 9.0);
        assert_eq!(policy.base(5), 25.0);
    }

    #[test]
    fn test_rarity() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.rarity("EAT"), 0.0);
        // C=1, A=0, T=0
        assert_eq!(policy.rarity("cat"), 2.0);
        // Z is class 3 plus the ultra bonus
        assert_eq!(policy.rarity("ZZZ"), 3.0 * (3.0 * 2.0 + 5.0));
    }

    #[test]
    fn test_streak() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy.next_streak(0, 5), 1);
        assert_eq!(policy.next_streak(3, 6), 4);
        assert_eq!(policy.next_streak(3, 4), 0);
    }

    #[test]
    fn test_chain_bonus_is_capped() {
        let policy = ScoringPolicy::default();
        let bonuses: Vec<f64> = (0..10).map(|s| policy.chain(s)).collect();
        assert!(bonuses.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(policy.chain(0), 0.0);
        assert_eq!(policy.chain(100), policy.chain_bonus_cap);
    }

    #[test]
    fn test_score_total() {
        let policy = ScoringPolicy::default();
        // base 9 + rarity 2 + link 2*2 + chain 0 = 15
        let plain = policy.score("CAT", 2, 0, &[], 1.0);
        assert_eq!(plain.total, 15);
        // multipliers compound
        let boosted = policy.score("CAT", 2, 0, &[2, 3], 1.0);
        assert_eq!(boosted.total, 90);
        let external = policy.score("CAT", 2, 0, &[], 1.5);
        assert_eq!(external.total, 23);
    }

    #[test]
    fn test_grades() {
        let benchmarks = Benchmarks {
            bronze: 10,
            silver: 20,
            gold: 30,
            platinum: 40,
        };
        assert_eq!(benchmarks.grade(0), Grade::None);
        assert_eq!(benchmarks.grade(10), Grade::Bronze);
        assert_eq!(benchmarks.grade(29), Grade::Silver);
        assert_eq!(benchmarks.grade(45), Grade::Platinum);
        assert_eq!(benchmarks.threshold(Grade::Gold), 30);
    }

    #[test]
    fn test_scaled_benchmarks() {
        let benchmarks = ScaledBenchmarks::default().compute(20, 12);
        assert_eq!(benchmarks.bronze, 24);
        assert!(benchmarks.bronze < benchmarks.silver);
        assert!(benchmarks.silver < benchmarks.gold);
        assert!(benchmarks.gold < benchmarks.platinum);
        // the baseline applies when the board has fewer words
        assert_eq!(
            ScaledBenchmarks::default().compute(3, 12),
            ScaledBenchmarks::default().compute(12, 12)
        );
    }
}

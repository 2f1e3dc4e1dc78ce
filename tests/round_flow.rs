//! Full rounds driven through the public API

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;

use tilechain::app::prepare_round;
use tilechain::game::round::{Env, Step, WordRecord};
use tilechain::game::special::SpawnPolicy;
use tilechain::{Action, Dictionary, DictionaryStatus, EngineConfig, Outcome, RoundState, Rules};

const MAX_TURNS: usize = 200;

/// Trace the hinted word tile by tile and submit it. Returns the submit outcome.
fn play_hint(round: RoundState, env: &mut Env<'_, ChaCha8Rng>) -> (RoundState, Option<Outcome>) {
    let Some(dictionary) = env.dictionary.ready() else {
        return (round, None);
    };
    let Some(found) = round.hint(dictionary, env.rules.node_budget) else {
        return (round, None);
    };
    let mut state = round;
    for (i, &pos) in found.path.iter().enumerate() {
        let action = if i == 0 { Action::Begin(pos) } else { Action::Extend(pos) };
        let Step { state: next, outcome } = state.apply(action, env);
        assert_eq!(outcome, Outcome::PathChanged, "hint path step {} refused", i);
        state = next;
    }
    let Step { state, outcome } = state.apply(Action::Submit, env);
    (state, Some(outcome))
}

fn play_out(mut round: RoundState, rules: &Rules, dictionary: &DictionaryStatus, seed: u64) -> RoundState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut env = Env {
        dictionary,
        rules,
        rng: &mut rng,
    };
    for _ in 0..MAX_TURNS {
        if round.is_over() {
            break;
        }
        let (next, outcome) = play_hint(round, &mut env);
        round = next;
        match outcome {
            Some(Outcome::Committed(_)) => {}
            None => break,
            Some(other) => panic!("unexpected submit outcome {:?}", other),
        }
    }
    round
}

fn assert_invariants(records: &[WordRecord]) {
    let mut seen = BTreeSet::new();
    for (i, record) in records.iter().enumerate() {
        assert!(record.word.len() >= 3);
        for pair in record.path.windows(2) {
            assert!(pair[0].is_adjacent(&pair[1]), "{} breaks adjacency", record.word);
        }
        let distinct: BTreeSet<_> = record.path.iter().collect();
        assert_eq!(distinct.len(), record.path.len(), "{} reuses a cell", record.word);
        assert!(seen.insert(record.word.clone()), "{} played twice", record.word);
        if i > 0 {
            assert!(
                record.tiles.intersects(&records[i - 1].tiles),
                "{} does not link to {}",
                record.word,
                records[i - 1].word
            );
        }
    }
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.board.size = 4;
    config
}

#[test]
fn test_round_played_to_the_end_keeps_invariants() {
    let dictionary = Dictionary::embedded();
    let status = DictionaryStatus::Ready(dictionary.clone());
    let mut config = config();
    config.specials.enabled = false;
    let rules = config.rules();

    for seed in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        let prepared = prepare_round(&dictionary, &config, Some(seed), &AtomicBool::new(false)).unwrap();
        let round = play_out(prepared.round, &rules, &status, 7);
        let records = round.records();
        assert!(!records.is_empty(), "no word played on {}", seed);
        assert_invariants(records);

        let total: u64 = records.iter().map(|r| r.score).sum();
        assert_eq!(round.score(), total);
        assert_eq!(round.moves() as usize, records.len());
        if let Some(end) = round.end() {
            assert_eq!(end.score, round.score());
            assert_eq!(end.grade, round.grade());
        }
    }
}

#[test]
fn test_round_with_specials_keeps_invariants() {
    let dictionary = Dictionary::embedded();
    let status = DictionaryStatus::Ready(dictionary.clone());
    let mut config = config();
    config.specials = SpawnPolicy::default();
    config.play.spawn_threshold = tilechain::game::scoring::Grade::None;
    let rules = config.rules();

    let prepared = prepare_round(&dictionary, &config, Some("2024-02-29"), &AtomicBool::new(false)).unwrap();
    let round = play_out(prepared.round, &rules, &status, 11);
    assert!(!round.records().is_empty());
    assert_invariants(round.records());
    assert_eq!(round.moves() as usize, round.records().len());
}

#[test]
fn test_daily_move_limit_ends_round() {
    let dictionary = Dictionary::embedded();
    let status = DictionaryStatus::Ready(dictionary.clone());
    let mut config = config();
    config.specials.enabled = false;
    config.play.daily_move_limit = [2, 2];
    let rules = config.rules();

    let prepared = prepare_round(&dictionary, &config, Some("2024-03-01"), &AtomicBool::new(false)).unwrap();
    assert_eq!(prepared.round.move_limit(), Some(2));
    let round = play_out(prepared.round, &rules, &status, 3);
    if round.records().len() == 2 {
        assert!(round.is_over());
        assert_eq!(
            round.end().map(|end| end.reason),
            Some(tilechain::game::round::EndReason::MoveLimit)
        );
    }
    assert!(round.records().len() <= 2);
}

#[test]
fn test_snapshot_survives_mid_round() {
    let dictionary = Dictionary::embedded();
    let status = DictionaryStatus::Ready(dictionary.clone());
    let rules = Rules::default();
    let prepared = prepare_round(&dictionary, &config(), Some("2024-04-01"), &AtomicBool::new(false)).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut env = Env {
        dictionary: &status,
        rules: &rules,
        rng: &mut rng,
    };
    let (round, _) = play_hint(prepared.round, &mut env);
    let json = round.to_json().unwrap();
    let restored = RoundState::from_json(&json).unwrap();
    assert_eq!(restored, round);
}

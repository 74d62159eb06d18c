use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use water_sort::generator::{LevelParams, generate};
use water_sort::{Bottle, GameSession, Label, SessionStatus, Symbol, can_pour, is_game_won, pour};

fn bottle(capacity: usize, repr: &str) -> Bottle {
    Bottle::with_symbols(capacity, repr.chars().map(Symbol::new).collect()).unwrap()
}

#[test]
fn generator_small_level() {
    let labels: Vec<Label> = "ABC".chars().map(Label::new).collect();
    let symbols: Vec<Symbol> = "AB".chars().map(Symbol::new).collect();
    let params = LevelParams {
        total_containers: 3,
        capacity: 4,
        difficulty: 1,
        labels: &labels,
        symbols: &symbols,
    };
    for seed in 0..50 {
        let bottles = generate(&params, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(bottles.len(), 3);
        let total: usize = bottles.iter().map(|(_, b)| b.get_filled_amount()).sum();
        assert_eq!(total, 8);
        assert!(bottles.iter().all(|(_, b)| b.get_filled_amount() <= 4));
    }
}

#[test]
fn pour_single_top_into_empty() {
    let mut source = bottle(4, "xxy");
    let mut destination = bottle(4, "");
    assert!(can_pour(&source, &destination));
    assert_eq!(pour(&mut source, &mut destination), 1);
    assert_eq!(source, bottle(4, "xx"));
    assert_eq!(destination, bottle(4, "y"));
}

#[test]
fn pour_fills_destination() {
    let mut source = bottle(4, "xx");
    let mut destination = bottle(4, "xxx");
    assert!(can_pour(&source, &destination));
    assert_eq!(pour(&mut source, &mut destination), 1);
    assert_eq!(destination, bottle(4, "xxxx"));
    assert!(destination.is_uniformly_full());
}

#[test]
fn empty_source_never_pours() {
    let source = bottle(4, "");
    for d in ["", "x", "xy", "xxxx"] {
        assert!(!can_pour(&source, &bottle(4, d)));
    }
}

#[test]
fn full_destination_never_accepts() {
    let destination = bottle(4, "xxxx");
    assert!(!can_pour(&bottle(4, "x"), &destination));
    assert!(!can_pour(&bottle(4, "yx"), &destination));
}

#[test]
fn win_check() {
    assert!(is_game_won(7, 5, 2));
    assert!(!is_game_won(7, 4, 2));
}

#[test]
fn random_play_keeps_invariants() {
    let labels: Vec<Label> = "ABCDEFGHIJ".chars().map(Label::new).collect();
    let symbols: Vec<Symbol> = "@#%$!+o?§&".chars().map(Symbol::new).collect();
    let mut rng = StdRng::seed_from_u64(2024);
    for difficulty in 1..=5 {
        let params = LevelParams {
            total_containers: 10,
            capacity: 8,
            difficulty,
            labels: &labels,
            symbols: &symbols,
        };
        let mut session = GameSession::new_game(&params, &mut rng).unwrap();
        let mut counts = symbol_counts(&session);
        counts.sort();
        for _ in 0..2000 {
            if session.status() != SessionStatus::InProgress {
                break;
            }
            let from = labels[rng.random_range(0..10)];
            let to = labels[rng.random_range(0..10)];
            if from == to {
                continue;
            }
            let legal = can_pour(session.bottle(from).unwrap(), session.bottle(to).unwrap());
            if !legal {
                continue;
            }
            session.attempt_move(from, to).unwrap();
            let mut now = symbol_counts(&session);
            now.sort();
            assert_eq!(now, counts);
            assert!(session.bottles().iter().all(|(_, b)| b.get_filled_amount() <= 8));
            assert_eq!(session.solved_count(), session.count_solved());
        }
    }
}

fn symbol_counts(session: &GameSession) -> Vec<(char, usize)> {
    let mut counts: Vec<(char, usize)> = Vec::new();
    for (_, b) in session.bottles() {
        for s in b.get_symbols() {
            match counts.iter_mut().find(|(c, _)| *c == s.as_char()) {
                Some((_, n)) => *n += 1,
                None => counts.push((s.as_char(), 1)),
            }
        }
    }
    counts
}

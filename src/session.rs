use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, SessionError};
use crate::generator::{LevelParams, generate};
use crate::model::{Bottle, Label, can_pour, pour};

/// Illegal move attempts allowed before the game is lost.
pub const MAX_ERRORS: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    WonByCompletion,
    LostByErrors,
    AbandonedByUser,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Poured { amount: usize, status: SessionStatus },
    Rejected { error_count: usize, status: SessionStatus },
}

/// Final figures handed to the driver when a session ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameOver {
    pub status: SessionStatus,
    pub error_count: usize,
    pub solved_count: usize,
}

/// True once every bottle that is meant to be filled is uniformly full.
pub fn is_game_won(total_containers: usize, solved_count: usize, difficulty: usize) -> bool {
    solved_count == total_containers - difficulty
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    bottles: Vec<(Label, Bottle)>,
    capacity: usize,
    difficulty: usize,
    error_count: usize,
    solved_count: usize,
    abandoned: bool,
}

impl GameSession {
    /// Starts a fresh game from a randomly generated level.
    pub fn new_game<R: Rng + ?Sized>(
        params: &LevelParams,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let bottles = generate(params, rng)?;
        let session = Self::from_bottles(params.capacity, params.difficulty, 0, bottles)?;
        info!(
            bottles = session.total_containers(),
            capacity = session.capacity,
            difficulty = session.difficulty,
            "new game"
        );
        Ok(session)
    }

    /// Rebuilds a session from its parts. The solved count is always recomputed.
    pub fn from_bottles(
        capacity: usize,
        difficulty: usize,
        error_count: usize,
        bottles: Vec<(Label, Bottle)>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if difficulty >= bottles.len() {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty,
                bottles: bottles.len(),
            });
        }
        let mut seen = HashSet::new();
        for (label, bottle) in &bottles {
            if !seen.insert(*label) {
                return Err(ConfigError::DuplicateEntry {
                    alphabet: "label",
                    value: label.as_char(),
                });
            }
            if bottle.get_capacity() != capacity {
                return Err(ConfigError::CapacityMismatch {
                    label: label.as_char(),
                    expected: capacity,
                    found: bottle.get_capacity(),
                });
            }
        }
        let mut session = Self {
            bottles,
            capacity,
            difficulty,
            error_count,
            solved_count: 0,
            abandoned: false,
        };
        session.solved_count = session.count_solved();
        Ok(session)
    }

    pub fn bottles(&self) -> &[(Label, Bottle)] {
        &self.bottles
    }

    pub fn bottle(&self, label: Label) -> Option<&Bottle> {
        self.position(label).map(|i| &self.bottles[i].1)
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.bottles.iter().map(|(label, _)| *label)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_containers(&self) -> usize {
        self.bottles.len()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn solved_count(&self) -> usize {
        self.solved_count
    }

    pub fn is_game_won(&self) -> bool {
        is_game_won(self.total_containers(), self.solved_count, self.difficulty)
    }

    pub fn status(&self) -> SessionStatus {
        if self.abandoned {
            SessionStatus::AbandonedByUser
        } else if self.is_game_won() {
            SessionStatus::WonByCompletion
        } else if self.error_count >= MAX_ERRORS {
            SessionStatus::LostByErrors
        } else {
            SessionStatus::InProgress
        }
    }

    /// `Some` once the session reached a terminal state.
    pub fn game_over(&self) -> Option<GameOver> {
        let status = self.status();
        status.is_finished().then_some(GameOver {
            status,
            error_count: self.error_count,
            solved_count: self.solved_count,
        })
    }

    /// Number of bottles that are currently uniformly full.
    pub fn count_solved(&self) -> usize {
        self.bottles
            .iter()
            .filter(|(_, bottle)| bottle.is_uniformly_full())
            .count()
    }

    fn position(&self, label: Label) -> Option<usize> {
        self.bottles.iter().position(|(l, _)| *l == label)
    }

    fn pair_mut(&mut self, a: usize, b: usize) -> (&mut Bottle, &mut Bottle) {
        if a < b {
            let (left, right) = self.bottles.split_at_mut(b);
            (&mut left[a].1, &mut right[0].1)
        } else {
            let (left, right) = self.bottles.split_at_mut(a);
            (&mut right[0].1, &mut left[b].1)
        }
    }

    /// Plays one turn. An illegal pour costs one error and changes nothing else.
    pub fn attempt_move(
        &mut self,
        source: Label,
        destination: Label,
    ) -> Result<MoveOutcome, SessionError> {
        if self.status().is_finished() {
            return Err(SessionError::Finished);
        }
        let from = self
            .position(source)
            .ok_or(SessionError::UnknownLabel(source))?;
        let to = self
            .position(destination)
            .ok_or(SessionError::UnknownLabel(destination))?;
        if from == to {
            return Err(SessionError::SameBottle(source));
        }

        let (source_bottle, destination_bottle) = self.pair_mut(from, to);
        if !can_pour(source_bottle, destination_bottle) {
            self.error_count += 1;
            debug!(%source, %destination, errors = self.error_count, "illegal move");
            return Ok(MoveOutcome::Rejected {
                error_count: self.error_count,
                status: self.status(),
            });
        }
        let amount = pour(source_bottle, destination_bottle);

        // Pouring out of a full bottle can un-solve it, so never count incrementally.
        let solved = self.count_solved();
        if solved < self.solved_count {
            warn!(%source, "a solved bottle was poured from");
        }
        self.solved_count = solved;
        debug!(%source, %destination, amount, solved, "poured");

        let status = self.status();
        if status == SessionStatus::WonByCompletion {
            info!(errors = self.error_count, "game won");
        }
        Ok(MoveOutcome::Poured { amount, status })
    }

    /// Ends the session at the player's request.
    pub fn abandon(&mut self) -> GameOver {
        self.abandoned = true;
        info!(
            errors = self.error_count,
            solved = self.solved_count,
            "game abandoned"
        );
        GameOver {
            status: SessionStatus::AbandonedByUser,
            error_count: self.error_count,
            solved_count: self.solved_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Symbol;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bottle(capacity: usize, repr: &str) -> Bottle {
        Bottle::with_symbols(capacity, repr.chars().map(Symbol::new).collect()).unwrap()
    }

    fn session(difficulty: usize, bottles: &[(char, &str)]) -> GameSession {
        let bottles = bottles
            .iter()
            .map(|&(l, repr)| (Label::new(l), bottle(4, repr)))
            .collect();
        GameSession::from_bottles(4, difficulty, 0, bottles).unwrap()
    }

    fn total_symbols(session: &GameSession) -> usize {
        session
            .bottles()
            .iter()
            .map(|(_, b)| b.get_filled_amount())
            .sum()
    }

    #[test]
    fn win_check_is_pure() {
        assert!(is_game_won(10, 7, 3));
        assert!(is_game_won(10, 7, 3));
        assert!(!is_game_won(10, 6, 3));
    }

    #[test]
    fn legal_move_pours_and_wins() {
        let mut s = session(1, &[('A', "xxxy"), ('B', "yyy"), ('C', "x")]);
        let outcome = s.attempt_move(Label::new('a'), Label::new('b')).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Poured {
                amount: 1,
                status: SessionStatus::InProgress
            }
        );
        assert_eq!(s.solved_count(), 1);
        let outcome = s.attempt_move(Label::new('C'), Label::new('A')).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Poured {
                amount: 1,
                status: SessionStatus::WonByCompletion
            }
        );
        assert_eq!(s.solved_count(), 2);
        assert_eq!(
            s.attempt_move(Label::new('A'), Label::new('C')),
            Err(SessionError::Finished)
        );
    }

    #[test]
    fn three_illegal_moves_lose() {
        let mut s = session(1, &[('A', "xy"), ('B', "yx"), ('C', "xxyy")]);
        for expected in 1..=3 {
            let before = s.clone();
            let outcome = s.attempt_move(Label::new('A'), Label::new('B')).unwrap();
            assert!(matches!(outcome, MoveOutcome::Rejected { error_count, .. } if error_count == expected));
            assert_eq!(s.bottles(), before.bottles());
            assert_eq!(s.solved_count(), before.solved_count());
        }
        assert_eq!(s.status(), SessionStatus::LostByErrors);
        assert_eq!(
            s.game_over(),
            Some(GameOver {
                status: SessionStatus::LostByErrors,
                error_count: 3,
                solved_count: 0
            })
        );
    }

    #[test]
    fn driver_faults_do_not_count_as_errors() {
        let mut s = session(1, &[('A', "xy"), ('B', ""), ('C', "")]);
        assert_eq!(
            s.attempt_move(Label::new('A'), Label::new('A')),
            Err(SessionError::SameBottle(Label::new('A')))
        );
        assert_eq!(
            s.attempt_move(Label::new('A'), Label::new('Q')),
            Err(SessionError::UnknownLabel(Label::new('Q')))
        );
        assert_eq!(s.error_count(), 0);
    }

    #[test]
    fn pouring_from_a_solved_bottle_lowers_solved_count() {
        let mut s = session(2, &[('A', "xxxx"), ('B', "yx"), ('C', "yy"), ('D', "x")]);
        assert_eq!(s.solved_count(), 1);
        let outcome = s.attempt_move(Label::new('A'), Label::new('B')).unwrap();
        assert!(matches!(outcome, MoveOutcome::Poured { amount: 2, .. }));
        assert_eq!(s.bottle(Label::new('A')), Some(&bottle(4, "xx")));
        assert_eq!(s.solved_count(), 0);
        assert_eq!(s.count_solved(), s.solved_count());
    }

    #[test]
    fn abandon_ends_the_session() {
        let mut s = session(1, &[('A', "xy"), ('B', "yx"), ('C', "xy")]);
        let over = s.abandon();
        assert_eq!(over.status, SessionStatus::AbandonedByUser);
        assert_eq!(s.status(), SessionStatus::AbandonedByUser);
        assert_eq!(
            s.attempt_move(Label::new('A'), Label::new('C')),
            Err(SessionError::Finished)
        );
    }

    #[test]
    fn solved_count_follows_the_full_bottle() {
        let mut s = session(2, &[('A', "xxxx"), ('B', "yy"), ('C', "x"), ('D', "yy")]);
        assert_eq!(s.solved_count(), 1);
        s.attempt_move(Label::new('A'), Label::new('C')).unwrap();
        assert_eq!(s.bottle(Label::new('A')), Some(&bottle(4, "x")));
        assert_eq!(s.solved_count(), 1);
        assert_eq!(s.bottle(Label::new('C')), Some(&bottle(4, "xxxx")));
        s.attempt_move(Label::new('C'), Label::new('A')).unwrap();
        assert_eq!(s.solved_count(), 1);
        s.attempt_move(Label::new('B'), Label::new('D')).unwrap();
        assert_eq!(s.solved_count(), 2);
        assert_eq!(s.count_solved(), s.solved_count());
    }

    #[test]
    fn random_legal_play_conserves_symbols() {
        let labels: Vec<Label> = "ABCDEFG".chars().map(Label::new).collect();
        let symbols: Vec<Symbol> = "1234567".chars().map(Symbol::new).collect();
        let params = LevelParams {
            total_containers: 7,
            capacity: 8,
            difficulty: 2,
            labels: &labels,
            symbols: &symbols,
        };
        let mut rng = StdRng::seed_from_u64(99);
        let mut s = GameSession::new_game(&params, &mut rng).unwrap();
        let total = total_symbols(&s);
        assert_eq!(total, 5 * 8);
        for _ in 0..500 {
            if s.status().is_finished() {
                break;
            }
            let from = labels[rng.random_range(0..7)];
            let to = labels[rng.random_range(0..7)];
            let legal = from != to && can_pour(s.bottle(from).unwrap(), s.bottle(to).unwrap());
            if !legal {
                continue;
            }
            s.attempt_move(from, to).unwrap();
            assert_eq!(total_symbols(&s), total);
            assert!(s.bottles().iter().all(|(_, b)| b.get_filled_amount() <= 8));
            assert_eq!(s.solved_count(), s.count_solved());
        }
    }

    #[test]
    fn from_bottles_rejects_inconsistent_parts() {
        let bottles = vec![
            (Label::new('A'), bottle(4, "x")),
            (Label::new('A'), bottle(4, "")),
        ];
        assert!(matches!(
            GameSession::from_bottles(4, 1, 0, bottles),
            Err(ConfigError::DuplicateEntry { .. })
        ));
        let bottles = vec![(Label::new('A'), bottle(4, "x")), (Label::new('B'), bottle(5, ""))];
        assert!(matches!(
            GameSession::from_bottles(4, 1, 0, bottles),
            Err(ConfigError::CapacityMismatch { label: 'B', .. })
        ));
        let bottles = vec![(Label::new('A'), bottle(4, "x"))];
        assert!(matches!(
            GameSession::from_bottles(4, 1, 0, bottles),
            Err(ConfigError::DifficultyTooHigh { .. })
        ));
    }
}

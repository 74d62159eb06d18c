use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::debug;

use crate::model::{Bottle, Label};
use crate::session::GameSession;

/// States explored across all branches before giving up.
pub const DEFAULT_STATE_BUDGET: usize = 200_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveAction {
    pub from_container: usize,
    pub to_container: usize,
}

#[derive(Clone)]
struct GameStateWithHistory {
    state: Vec<Bottle>,
    history: Vec<MoveAction>,
}

impl GameStateWithHistory {
    fn apply(&self, action: MoveAction) -> GameStateWithHistory {
        let mut state = self.state.clone();
        let mut source = std::mem::replace(&mut state[action.from_container], Bottle::new(0));
        source.pour_into(&mut state[action.to_container]);
        state[action.from_container] = source;
        let mut history = self.history.clone();
        history.push(action);
        GameStateWithHistory { state, history }
    }
}

/// Depth-first search for a sequence of pours that wins the game.
pub struct Solver {
    starting_state: Vec<Bottle>,
    goal: usize,
    state_budget: usize,
}

impl Solver {
    pub fn new(session: &GameSession) -> Solver {
        Solver {
            starting_state: session.bottles().iter().map(|(_, b)| b.clone()).collect(),
            goal: session.total_containers() - session.difficulty(),
            state_budget: DEFAULT_STATE_BUDGET,
        }
    }

    pub fn with_budget(mut self, state_budget: usize) -> Solver {
        self.state_budget = state_budget;
        self
    }

    fn is_solved(state: &[Bottle], goal: usize) -> bool {
        state.iter().filter(|b| b.is_uniformly_full()).count() == goal
    }

    /// Legal pours worth trying. Skips pours out of solved bottles and moving a
    /// single-colour bottle into an empty one, which never makes progress.
    fn candidate_moves(state: &[Bottle]) -> Vec<MoveAction> {
        let mut moves = Vec::new();
        for (from, source) in state.iter().enumerate() {
            if source.is_empty() || source.is_uniformly_full() {
                continue;
            }
            for (to, destination) in state.iter().enumerate() {
                if from == to || !source.could_pour_into(destination) {
                    continue;
                }
                if destination.is_empty() && source.is_uniform() {
                    continue;
                }
                moves.push(MoveAction {
                    from_container: from,
                    to_container: to,
                });
            }
        }
        moves
    }

    /// Returns a winning move sequence, or `None` if none was found within the budget.
    pub fn solve(&self) -> Option<Vec<MoveAction>> {
        if Self::is_solved(&self.starting_state, self.goal) {
            return Some(vec![]);
        }
        let start = GameStateWithHistory {
            state: self.starting_state.clone(),
            history: vec![],
        };
        let first_moves = Self::candidate_moves(&start.state);
        if first_moves.is_empty() {
            debug!("no legal moves from the starting state");
            return None;
        }
        let branch_budget = (self.state_budget / first_moves.len()).max(1);
        debug!(
            branches = first_moves.len(),
            branch_budget, "searching for a solution"
        );

        let found = AtomicBool::new(false);
        first_moves.par_iter().find_map_any(|&action| {
            let branch = start.apply(action);
            self.search(branch, branch_budget, &found)
        })
    }

    fn search(
        &self,
        start: GameStateWithHistory,
        budget: usize,
        found: &AtomicBool,
    ) -> Option<Vec<MoveAction>> {
        let mut visited: HashSet<Vec<Bottle>> = HashSet::new();
        visited.insert(self.starting_state.clone());
        let mut considering_states = vec![start];
        let mut explored = 0;

        while let Some(current) = considering_states.pop() {
            // Another branch already has an answer.
            if found.load(Ordering::Relaxed) {
                return None;
            }
            if !visited.insert(current.state.clone()) {
                continue;
            }
            if Self::is_solved(&current.state, self.goal) {
                found.store(true, Ordering::Relaxed);
                debug!(moves = current.history.len(), explored, "solution found");
                return Some(current.history);
            }
            explored += 1;
            if explored >= budget {
                debug!(explored, "branch budget exhausted");
                return None;
            }
            for action in Self::candidate_moves(&current.state) {
                let next = current.apply(action);
                if !visited.contains(&next.state) {
                    considering_states.push(next);
                }
            }
        }
        None
    }
}

impl GameSession {
    /// Suggests the next pour of a winning line, as (source, destination).
    pub fn hint(&self) -> Option<(Label, Label)> {
        self.hint_with_budget(DEFAULT_STATE_BUDGET)
    }

    pub fn hint_with_budget(&self, state_budget: usize) -> Option<(Label, Label)> {
        if self.status().is_finished() {
            return None;
        }
        let solution = Solver::new(self).with_budget(state_budget).solve()?;
        let first = solution.first()?;
        let bottles = self.bottles();
        Some((
            bottles[first.from_container].0,
            bottles[first.to_container].0,
        ))
    }

    /// Whether a winning line exists within the default search budget.
    pub fn is_solvable(&self) -> bool {
        Solver::new(self).solve().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Symbol;
    use crate::session::SessionStatus;

    fn session(capacity: usize, difficulty: usize, bottles: &[(char, &str)]) -> GameSession {
        let bottles = bottles
            .iter()
            .map(|&(l, repr)| {
                let symbols = repr.chars().map(Symbol::new).collect();
                (Label::new(l), Bottle::with_symbols(capacity, symbols).unwrap())
            })
            .collect();
        GameSession::from_bottles(capacity, difficulty, 0, bottles).unwrap()
    }

    #[test]
    fn solution_wins_when_replayed() {
        let mut s = session(2, 1, &[('A', "xy"), ('B', "yx"), ('C', "")]);
        let solution = Solver::new(&s).solve().expect("puzzle is solvable");
        assert!(!solution.is_empty());
        let labels: Vec<Label> = s.labels().collect();
        for action in solution {
            s.attempt_move(labels[action.from_container], labels[action.to_container])
                .unwrap();
        }
        assert_eq!(s.status(), SessionStatus::WonByCompletion);
    }

    #[test]
    fn deeper_puzzle_is_solved() {
        let s = session(
            4,
            2,
            &[('A', "xyzx"), ('B', "zyxy"), ('C', "yzxz"), ('D', ""), ('E', "")],
        );
        assert!(s.is_solvable());
        let (from, to) = s.hint().unwrap();
        assert_ne!(from, to);
        assert!(s.bottle(from).unwrap().could_pour_into(s.bottle(to).unwrap()));
    }

    #[test]
    fn stuck_position_has_no_solution() {
        let s = session(2, 1, &[('A', "xy"), ('B', "yx")]);
        assert!(Solver::new(&s).solve().is_none());
        assert_eq!(s.hint(), None);
    }

    #[test]
    fn finished_game_gives_no_hint() {
        let s = session(2, 1, &[('A', "xx"), ('B', "")]);
        assert_eq!(s.status(), SessionStatus::WonByCompletion);
        assert_eq!(s.hint(), None);
        assert_eq!(Solver::new(&s).solve(), Some(vec![]));
    }

    #[test]
    fn candidate_moves_skip_pointless_pours() {
        let s = session(2, 1, &[('A', "xx"), ('B', "y"), ('C', "")]);
        let state: Vec<Bottle> = s.bottles().iter().map(|(_, b)| b.clone()).collect();
        assert!(Solver::candidate_moves(&state).is_empty());
    }
}

//! Water sort puzzle: bottles of stacked symbols, poured until each colour fills a bottle.

pub mod cli;
pub mod config;
pub mod error;
pub mod gameplay;
pub mod generator;
pub mod logging;
pub mod menu;
pub mod model;
pub mod persistence;
pub mod prompt;
pub mod renderer;
pub mod session;
pub mod solver;

pub use error::{ConfigError, Error, PersistenceError, Result, SessionError};
pub use model::{Bottle, Label, Symbol, can_pour, pour};
pub use session::{GameOver, GameSession, MoveOutcome, SessionStatus, is_game_won};

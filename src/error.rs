use std::path::PathBuf;
use thiserror::Error;

use crate::model::Label;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to access config file '{path}': {source}", path = path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bad or out-of-range game configuration. Raised before any session exists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bottle capacity must be positive")]
    ZeroCapacity,

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfBounds {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("difficulty {difficulty} must be lower than the number of bottles ({bottles})")]
    DifficultyTooHigh { difficulty: usize, bottles: usize },

    #[error("difficulty {difficulty} exceeds the bottle capacity ({capacity})")]
    DifficultyExceedsCapacity { difficulty: usize, capacity: usize },

    #[error("{alphabet} alphabet has {len} entries, at least {needed} are required")]
    AlphabetTooShort {
        alphabet: &'static str,
        len: usize,
        needed: usize,
    },

    #[error("{alphabet} alphabet contains '{value}' more than once")]
    DuplicateEntry { alphabet: &'static str, value: char },

    #[error("'{value}' cannot be used in the {alphabet} alphabet")]
    ReservedCharacter { alphabet: &'static str, value: char },

    #[error("bottle '{label}' has capacity {found}, expected {expected}")]
    CapacityMismatch {
        label: char,
        expected: usize,
        found: usize,
    },

    #[error("invalid difficulty '{0}' (options: random; 1; 2; 3; 4; 5)")]
    InvalidDifficulty(String),

    #[error("config line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("config file is missing the {0} value")]
    MissingValue(&'static str),
}

/// Reading or writing a saved game failed. The in-memory session is never touched.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("save line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("save file is missing the {0} record")]
    MissingRecord(&'static str),

    #[error("saved game is inconsistent: {0}")]
    Inconsistent(String),
}

/// Driver input that cannot be turned into a move. Never counted as a player error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("there is no bottle labelled '{0}'")]
    UnknownLabel(Label),

    #[error("cannot pour bottle '{0}' into itself")]
    SameBottle(Label),

    #[error("the game is already over")]
    Finished,
}

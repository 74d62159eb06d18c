use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use tracing::{debug, info};

use crate::error::{ConfigError, Error, Result};
use crate::generator::LevelParams;
use crate::model::{Label, Symbol};

pub const CONFIG_FILE_NAME: &str = "cfg.newGame.txt";

pub const CAPACITY_BOUNDS: RangeInclusive<usize> = 8..=20;
pub const BOTTLE_BOUNDS: RangeInclusive<usize> = 7..=10;
pub const DIFFICULTY_BOUNDS: RangeInclusive<usize> = 1..=5;

/// Typed at the source prompt to leave the game.
pub const QUIT_KEY: char = 'Z';
/// Typed at the source prompt to ask for a hint.
pub const HINT_KEY: char = '?';
/// Typed at the source prompt to copy the game to the clipboard.
pub const COPY_KEY: char = '*';

const DEFAULT_SYMBOLS: &str = "@#%$!+o?§&";
const DEFAULT_LABELS: &str = "ABCDEFGHIJ";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Random,
    Level(usize),
}

impl Difficulty {
    /// Picks the level for a new game; `Random` draws from [`DIFFICULTY_BOUNDS`].
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Difficulty::Random => rng.random_range(DIFFICULTY_BOUNDS),
            Difficulty::Level(level) => *level,
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(Difficulty::Random);
        }
        match s.parse::<usize>() {
            Ok(level) if DIFFICULTY_BOUNDS.contains(&level) => Ok(Difficulty::Level(level)),
            _ => Err(ConfigError::InvalidDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Random => write!(f, "random"),
            Difficulty::Level(level) => write!(f, "{level}"),
        }
    }
}

/// Settings used to build new games, stored in the line-oriented config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub capacity: usize,
    pub total_containers: usize,
    pub symbols: Vec<Symbol>,
    pub labels: Vec<Label>,
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            total_containers: 10,
            symbols: DEFAULT_SYMBOLS.chars().map(Symbol::new).collect(),
            labels: DEFAULT_LABELS.chars().map(Label::new).collect(),
            difficulty: Difficulty::Random,
        }
    }
}

fn check_bounds(
    field: &'static str,
    value: usize,
    bounds: &RangeInclusive<usize>,
) -> std::result::Result<(), ConfigError> {
    if bounds.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfBounds {
            field,
            value,
            min: *bounds.start(),
            max: *bounds.end(),
        })
    }
}

fn check_alphabet(
    alphabet: &'static str,
    values: impl Iterator<Item = char>,
    needed: usize,
    reserved: impl Fn(char) -> bool,
) -> std::result::Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for value in values {
        if reserved(value) {
            return Err(ConfigError::ReservedCharacter { alphabet, value });
        }
        if !seen.insert(value) {
            return Err(ConfigError::DuplicateEntry { alphabet, value });
        }
    }
    if seen.len() < needed {
        return Err(ConfigError::AlphabetTooShort {
            alphabet,
            len: seen.len(),
            needed,
        });
    }
    Ok(())
}

/// Labels must be ASCII letters or digits, and not the quit key.
pub fn is_reserved_label(c: char) -> bool {
    !c.is_ascii_alphanumeric() || c == QUIT_KEY
}

fn is_comment(line: &str) -> bool {
    line == "#" || line.starts_with("# ")
}

impl GameConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_bounds("bottle capacity", self.capacity, &CAPACITY_BOUNDS)?;
        check_bounds("number of bottles", self.total_containers, &BOTTLE_BOUNDS)?;
        if let Difficulty::Level(level) = self.difficulty {
            check_bounds("difficulty", level, &DIFFICULTY_BOUNDS)?;
        }
        check_alphabet(
            "symbol",
            self.symbols.iter().map(Symbol::as_char),
            self.total_containers,
            |c| c == ',' || c == ':' || c.is_whitespace(),
        )?;
        check_alphabet(
            "label",
            self.labels.iter().map(Label::as_char),
            self.total_containers,
            is_reserved_label,
        )?;
        Ok(())
    }

    /// Parameters for one new game at an already resolved difficulty.
    pub fn level_params(&self, difficulty: usize) -> LevelParams<'_> {
        LevelParams {
            total_containers: self.total_containers,
            capacity: self.capacity,
            difficulty,
            labels: &self.labels,
            symbols: &self.symbols,
        }
    }

    /// Reads the five values in file order, skipping comments and blank lines.
    pub fn parse(text: &str) -> std::result::Result<Self, ConfigError> {
        let mut values = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !is_comment(line));

        let mut next = |name: &'static str| values.next().ok_or(ConfigError::MissingValue(name));
        let number = |(line, value): (usize, &str)| {
            value.parse::<usize>().map_err(|_| ConfigError::Malformed {
                line,
                reason: format!("expected a number, found '{value}'"),
            })
        };

        let capacity = number(next("bottle capacity")?)?;
        let total_containers = number(next("number of bottles")?)?;
        let (_, symbols) = next("symbols")?;
        let (_, labels) = next("labels")?;
        let (_, difficulty) = next("difficulty")?;
        if let Ok((line, extra)) = next("trailing") {
            return Err(ConfigError::Malformed {
                line,
                reason: format!("unexpected value '{extra}'"),
            });
        }

        let config = Self {
            capacity,
            total_containers,
            symbols: symbols.chars().map(Symbol::new).collect(),
            labels: labels.chars().map(Label::new).collect(),
            difficulty: difficulty.parse()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_file_text(&self) -> String {
        let symbols: String = self.symbols.iter().map(Symbol::as_char).collect();
        let labels: String = self.labels.iter().map(Label::as_char).collect();
        format!(
            "# Bottle capacity (Min {cap_min}, Max {cap_max})\n{capacity}\n\n\
             # Total number of bottles in the game (Min {bot_min}, Max {bot_max})\n{total}\n\n\
             # Available symbols (At least one different symbol per bottle)\n{symbols}\n\n\
             # Identifying letters for the bottles (One different letter per bottle)\n{labels}\n\n\
             # Expertise (options: random; 1; 2; 3; 4; 5)\n{difficulty}\n",
            cap_min = CAPACITY_BOUNDS.start(),
            cap_max = CAPACITY_BOUNDS.end(),
            capacity = self.capacity,
            bot_min = BOTTLE_BOUNDS.start(),
            bot_max = BOTTLE_BOUNDS.end(),
            total = self.total_containers,
            difficulty = self.difficulty,
        )
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Loads the config, writing the default one first if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "writing default config");
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
            Err(source) => Err(Error::ConfigIo {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_file_text()).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }

    fn updated(
        &mut self,
        change: impl FnOnce(&mut GameConfig),
    ) -> std::result::Result<(), ConfigError> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    pub fn set_capacity(&mut self, capacity: usize) -> std::result::Result<(), ConfigError> {
        self.updated(|c| c.capacity = capacity)
    }

    pub fn set_total_containers(&mut self, total: usize) -> std::result::Result<(), ConfigError> {
        self.updated(|c| c.total_containers = total)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> std::result::Result<(), ConfigError> {
        self.updated(|c| c.difficulty = difficulty)
    }
}

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::ConfigError;
use crate::model::{Bottle, Label, Symbol};

/// Resolved parameters for building a new level.
#[derive(Clone, Debug)]
pub struct LevelParams<'a> {
    pub total_containers: usize,
    pub capacity: usize,
    pub difficulty: usize,
    pub labels: &'a [Label],
    pub symbols: &'a [Symbol],
}

impl LevelParams<'_> {
    /// Number of distinct colors in play, one per bottle that must end up full.
    pub fn color_count(&self) -> usize {
        self.total_containers - self.difficulty
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.difficulty >= self.total_containers {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty: self.difficulty,
                bottles: self.total_containers,
            });
        }
        if self.difficulty > self.capacity {
            return Err(ConfigError::DifficultyExceedsCapacity {
                difficulty: self.difficulty,
                capacity: self.capacity,
            });
        }
        if self.labels.len() < self.total_containers {
            return Err(ConfigError::AlphabetTooShort {
                alphabet: "label",
                len: self.labels.len(),
                needed: self.total_containers,
            });
        }
        if self.symbols.len() < self.color_count() {
            return Err(ConfigError::AlphabetTooShort {
                alphabet: "symbol",
                len: self.symbols.len(),
                needed: self.color_count(),
            });
        }
        let mut seen = HashSet::new();
        for label in &self.labels[..self.total_containers] {
            if !seen.insert(label.as_char()) {
                return Err(ConfigError::DuplicateEntry {
                    alphabet: "label",
                    value: label.as_char(),
                });
            }
        }
        seen.clear();
        for symbol in &self.symbols[..self.color_count()] {
            if !seen.insert(symbol.as_char()) {
                return Err(ConfigError::DuplicateEntry {
                    alphabet: "symbol",
                    value: symbol.as_char(),
                });
            }
        }
        Ok(())
    }
}

/// `capacity` copies of each of the first `color_count` symbols, shuffled.
pub fn random_symbols<R: Rng + ?Sized>(
    capacity: usize,
    color_count: usize,
    symbols: &[Symbol],
    rng: &mut R,
) -> Vec<Symbol> {
    let mut result: Vec<Symbol> = symbols[..color_count]
        .iter()
        .flat_map(|&s| std::iter::repeat_n(s, capacity))
        .collect();
    result.shuffle(rng);
    result
}

/// Builds a randomly filled set of bottles, labelled in alphabet order.
///
/// Symbols for one bottle that is not the last: `capacity - difficulty ..= capacity`,
/// clamped to what is left. The lower bound is raised so the `bottles_after`
/// bottles can still hold the rest.
fn chunk_length<R: Rng + ?Sized>(
    capacity: usize,
    difficulty: usize,
    remaining: usize,
    bottles_after: usize,
    rng: &mut R,
) -> usize {
    let low = (capacity - difficulty).max(remaining.saturating_sub(capacity * bottles_after));
    if low >= capacity.min(remaining) {
        return capacity.min(remaining);
    }
    rng.random_range(low..=capacity).min(remaining)
}

/// Each bottle but the last takes a chunk of `capacity - difficulty ..= capacity`
/// symbols from the shuffled pool; the last one takes whatever remains. The draw
/// is narrowed when needed so the bottles still to be filled can hold the rest
/// of the pool.
pub fn generate<R: Rng + ?Sized>(
    params: &LevelParams,
    rng: &mut R,
) -> Result<Vec<(Label, Bottle)>, ConfigError> {
    params.validate()?;
    let capacity = params.capacity;
    let total = params.total_containers;
    let pool = random_symbols(capacity, params.color_count(), params.symbols, rng);
    debug!(
        total,
        capacity,
        difficulty = params.difficulty,
        symbols = pool.len(),
        "generating level"
    );

    let mut bottles = Vec::with_capacity(total);
    let mut cursor = 0;
    for (index, &label) in params.labels[..total].iter().enumerate() {
        let remaining = pool.len() - cursor;
        let take = if index + 1 == total {
            remaining
        } else {
            chunk_length(capacity, params.difficulty, remaining, total - index - 1, rng)
        };
        let chunk = pool[cursor..cursor + take].to_vec();
        cursor += take;
        let bottle = Bottle::with_symbols(capacity, chunk)
            .expect("chunk length is bounded by capacity");
        bottles.push((label, bottle));
    }
    Ok(bottles)
}

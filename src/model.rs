use std::fmt;

/// One unit of "liquid". Symbols are only ever compared for equality.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(char);

impl Symbol {
    pub fn new(ch: char) -> Self {
        Symbol(ch)
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a bottle as typed by the player.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Label(char);

impl Label {
    /// Labels are case-insensitive; they are stored upper-cased.
    pub fn new(ch: char) -> Self {
        Label(ch.to_ascii_uppercase())
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A bottle: a bottom-to-top stack of symbols that never holds more than `capacity`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bottle {
    symbols: Vec<Symbol>,
    capacity: usize,
}

impl Bottle {
    pub fn new(capacity: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a pre-filled bottle. Returns `None` if `symbols` does not fit.
    pub fn with_symbols(capacity: usize, symbols: Vec<Symbol>) -> Option<Self> {
        if symbols.len() > capacity {
            return None;
        }
        Some(Self { symbols, capacity })
    }

    /// Parses the `x,y,z` form used in saved games. An empty string is an empty bottle.
    pub fn new_from_repr(repr: &str, capacity: usize) -> Option<Self> {
        let repr = repr.trim();
        let mut symbols = Vec::new();
        if !repr.is_empty() {
            for token in repr.split(',') {
                let mut chars = token.trim().chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                symbols.push(Symbol::new(ch));
            }
        }
        Self::with_symbols(capacity, symbols)
    }

    pub fn get_text_representation(&self) -> String {
        self.symbols
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get_filled_amount(&self) -> usize {
        self.symbols.len()
    }

    pub fn get_empty_space(&self) -> usize {
        self.capacity - self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Top symbol and its 0-based position, or `None` for an empty bottle.
    pub fn get_top(&self) -> Option<(Symbol, usize)> {
        let depth = self.symbols.len().checked_sub(1)?;
        Some((self.symbols[depth], depth))
    }

    pub fn get_top_symbol(&self) -> Option<Symbol> {
        self.symbols.last().copied()
    }

    /// Length of the homogeneous run at the top of the bottle.
    pub fn get_top_run_length(&self) -> usize {
        let Some(top) = self.get_top_symbol() else {
            return 0;
        };
        self.symbols.iter().rev().take_while(|&&s| s == top).count()
    }

    /// Full to capacity with a single symbol. A partially filled bottle never counts.
    pub fn is_uniformly_full(&self) -> bool {
        match self.symbols.first() {
            Some(first) => {
                self.symbols.len() == self.capacity && self.symbols.iter().all(|s| s == first)
            }
            None => false,
        }
    }

    /// Holds a single symbol, whatever the fill level. Empty bottles are not uniform.
    pub fn is_uniform(&self) -> bool {
        match self.symbols.first() {
            Some(first) => self.symbols.iter().all(|s| s == first),
            None => false,
        }
    }

    fn pop_symbol(&mut self) -> Option<Symbol> {
        self.symbols.pop()
    }

    fn push_symbol(&mut self, symbol: Symbol) {
        assert!(
            self.symbols.len() < self.capacity,
            "bottle overflow: capacity {}",
            self.capacity
        );
        self.symbols.push(symbol);
    }

    /// How many symbols a pour into `other` would move. Zero means the move is illegal.
    pub fn get_pourable_amount(&self, other: &Bottle) -> usize {
        if !self.could_pour_into(other) {
            return 0;
        }
        self.get_top_run_length().min(other.get_empty_space())
    }

    /// The legality rule: a non-empty source may pour into an empty bottle, or into a
    /// bottle with free space whose top symbol matches.
    pub fn could_pour_into(&self, other: &Bottle) -> bool {
        let Some((source_symbol, _)) = self.get_top() else {
            return false;
        };
        match other.get_top() {
            None => true,
            Some((dest_symbol, dest_depth)) => {
                dest_depth + 1 < other.capacity && source_symbol == dest_symbol
            }
        }
    }

    /// Moves the maximal top run that fits, one symbol at a time, and returns how many moved.
    ///
    /// # Panics
    ///
    /// If the pour is illegal. Callers must check [`Bottle::could_pour_into`] first.
    pub fn pour_into(&mut self, other: &mut Bottle) -> usize {
        assert!(
            self.could_pour_into(other),
            "pour_into called for an illegal move"
        );
        let transfer_amount = self.get_pourable_amount(other);
        for _ in 0..transfer_amount {
            if let Some(symbol) = self.pop_symbol() {
                other.push_symbol(symbol);
            }
        }
        transfer_amount
    }
}

/// Free-function form of [`Bottle::could_pour_into`].
pub fn can_pour(source: &Bottle, destination: &Bottle) -> bool {
    source.could_pour_into(destination)
}

/// Free-function form of [`Bottle::pour_into`].
pub fn pour(source: &mut Bottle, destination: &mut Bottle) -> usize {
    source.pour_into(destination)
}

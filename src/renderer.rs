use std::fmt::Write;

use crate::model::{Bottle, Label};
use crate::session::GameSession;

/// Draws bottles as text columns, top of the stack first.
#[derive(Clone, Debug)]
pub struct Renderer {
    padding: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self { padding: 2 }
    }

    pub fn render_game(&self, session: &GameSession) -> String {
        self.render_bottles(session.bottles(), session.capacity(), session.error_count())
    }

    pub fn render_bottles(
        &self,
        bottles: &[(Label, Bottle)],
        capacity: usize,
        error_count: usize,
    ) -> String {
        let mut out = String::new();
        self.render_header(&mut out, bottles);
        for line in (0..capacity).rev() {
            for (_, bottle) in bottles {
                self.render_cell(&mut out, bottle, line);
            }
            out.push('\n');
        }
        let _ = writeln!(out, "NUMBER OF ERRORS: {error_count}");
        out
    }

    fn render_header(&self, out: &mut String, bottles: &[(Label, Bottle)]) {
        let column_width = 2 * self.padding + 3;
        out.push_str(&" ".repeat(self.padding + 1));
        for (label, _) in bottles {
            let _ = write!(out, "{label:<column_width$}");
        }
        out.push('\n');
    }

    fn render_cell(&self, out: &mut String, bottle: &Bottle, line: usize) {
        let pad = " ".repeat(self.padding);
        match bottle.get_symbols().get(line) {
            Some(symbol) => {
                let _ = write!(out, "{pad}|{symbol}|{pad}");
            }
            None => {
                let _ = write!(out, "{pad}| |{pad}");
            }
        }
    }
}

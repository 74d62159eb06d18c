use std::io::{self, BufRead, Write};
use std::path::Path;

use clipboard_rs::{Clipboard, ClipboardContext};
use tracing::{info, warn};

use crate::config::{COPY_KEY, HINT_KEY, QUIT_KEY};
use crate::error::{Error, Result, SessionError};
use crate::model::Label;
use crate::persistence::{save_path, write_save};
use crate::prompt::Console;
use crate::renderer::Renderer;
use crate::session::{GameOver, GameSession, MoveOutcome, SessionStatus};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlAction {
    PourInto(Label, Label),
    Hint,
    CopyState,
    Quit,
}

/// Drives one session turn by turn over a text console.
pub struct GameEngine {
    session: GameSession,
    renderer: Renderer,
}

impl GameEngine {
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            renderer: Renderer::new(),
        }
    }

    pub fn get_session(&self) -> &GameSession {
        &self.session
    }

    pub fn render(&self) -> String {
        self.renderer.render_game(&self.session)
    }

    fn label_options(&self) -> Vec<String> {
        self.session.labels().map(|l| l.to_string()).collect()
    }

    /// Reads the next action. Labels, the hint and copy keys, and the quit key are accepted.
    fn read_action<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        first_turn: bool,
    ) -> io::Result<ControlAction> {
        let labels = self.label_options();
        let mut options = labels.clone();
        options.push(HINT_KEY.to_string());
        options.push(COPY_KEY.to_string());
        let question = if first_turn {
            "Source bottle? ".to_string()
        } else {
            format!("Source bottle? ({QUIT_KEY} to leave game) ")
        };
        let quit = QUIT_KEY.to_string();
        let answer = console.ask_for(&question, &options, Some(quit.as_str()))?;

        let mut chars = answer.chars();
        let action = match chars.next() {
            Some(c) if c == QUIT_KEY => ControlAction::Quit,
            Some(c) if c == HINT_KEY => ControlAction::Hint,
            Some(c) if c == COPY_KEY => ControlAction::CopyState,
            Some(source) => {
                let destination = console.ask_for("Destination bottle? ", &labels, None)?;
                let destination = destination.chars().next().unwrap_or(source);
                ControlAction::PourInto(Label::new(source), Label::new(destination))
            }
            None => ControlAction::Quit,
        };
        Ok(action)
    }

    /// Applies one action and reports it. Returns the final figures once the game is over.
    pub fn handle_game_action<R: BufRead, W: Write>(
        &mut self,
        action: ControlAction,
        console: &mut Console<R, W>,
    ) -> io::Result<Option<GameOver>> {
        match action {
            ControlAction::PourInto(from, to) => match self.session.attempt_move(from, to) {
                Ok(MoveOutcome::Poured { .. }) => {
                    console.print(&self.render())?;
                }
                Ok(MoveOutcome::Rejected { .. }) => {
                    console.say("Error!")?;
                }
                Err(SessionError::SameBottle(_)) => {
                    console.say("Source and destination must be different bottles.")?;
                }
                Err(e) => {
                    console.say(&e.to_string())?;
                }
            },
            ControlAction::Hint => match self.session.hint() {
                Some((from, to)) => console.say(&format!("Hint: pour {from} into {to}."))?,
                None => console.say("No solution found from this position.")?,
            },
            ControlAction::CopyState => match set_clipboard(&self.session.to_save_text()) {
                Ok(()) => console.say("Game copied to the clipboard.")?,
                Err(e) => {
                    warn!(error = %e, "copy to clipboard failed");
                    console.say(&format!("Could not copy the game: {e}"))?;
                }
            },
            ControlAction::Quit => return Ok(Some(self.session.abandon())),
        }
        Ok(self.session.game_over())
    }

    /// Runs the turn loop until the game is won, lost or abandoned.
    pub fn play<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> io::Result<GameOver> {
        console.print(&self.render())?;
        let mut first_turn = true;
        loop {
            if let Some(over) = self.session.game_over() {
                return Ok(over);
            }
            let action = self.read_action(console, first_turn)?;
            first_turn = false;
            if let Some(over) = self.handle_game_action(action, console)? {
                return Ok(over);
            }
        }
    }
}

fn set_clipboard(content: &str) -> Result<()> {
    let ctx = ClipboardContext::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    ctx.set_text(content.to_string())
        .map_err(|e| Error::Clipboard(e.to_string()))
}

/// Closing dialogue: offer to save an abandoned game, or announce the result.
pub fn finish_game<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &GameSession,
    over: GameOver,
    saves_dir: &Path,
) -> Result<()> {
    if over.status != SessionStatus::AbandonedByUser {
        console.say(&format!(
            "Full bottles = {}   Errors = {}",
            over.solved_count, over.error_count
        ))?;
        if over.status == SessionStatus::WonByCompletion {
            console.say("CONGRATULATIONS!!")?;
        } else {
            console.say("Better luck next time!")?;
        }
        return Ok(());
    }

    let store = console.ask_for(
        "\nWant to store the game for future playing? (YES,NO) ",
        &["YES", "NO"],
        Some(""),
    )?;
    if store != "YES" {
        console.say("Better luck next time!")?;
        return Ok(());
    }

    let path = loop {
        let name = console.read_answer("Enter your name to store your game information: ")?;
        if name.is_empty() || name.contains(['/', '\\']) {
            console.say("Please choose a valid name.")?;
            continue;
        }
        let path = save_path(saves_dir, &name);
        if !path.exists() {
            break path;
        }
        let choice = console.ask_for(
            &format!(
                "A file with the name '{}' already exists. Do you want to overwrite it? (YES/NO): ",
                path.display()
            ),
            &["YES", "NO"],
            None,
        )?;
        if choice == "YES" {
            break path;
        }
        console.say("Please choose a different name for your game information.")?;
    };

    match write_save(&path, session) {
        Ok(()) => {
            console.say(&format!(
                "Game information has been successfully saved in: {}",
                path.display()
            ))?;
            console.say("Hope to see you again soon!")?;
        }
        Err(e) => {
            warn!(error = %e, "saving failed");
            console.say(&format!("Error writing information to the file: {e}"))?;
        }
    }
    info!(status = ?over.status, "session closed");
    Ok(())
}

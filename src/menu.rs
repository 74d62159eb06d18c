use std::io::{BufRead, Write};
use std::path::PathBuf;

use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::config::{BOTTLE_BOUNDS, CAPACITY_BOUNDS, Difficulty, GameConfig};
use crate::error::{ConfigError, Result};
use crate::gameplay::{GameEngine, finish_game};
use crate::persistence::{list_saves, read_save};
use crate::prompt::Console;
use crate::session::GameSession;

const MAIN_MENU: &str = "1 - New game \n2 - Load Game\n3 - Options\n\n";

/// Where the game keeps its files, plus the session RNG.
pub struct App {
    pub config_path: PathBuf,
    pub saves_dir: PathBuf,
    pub rng: StdRng,
}

impl App {
    /// Main menu, then one full game.
    pub fn run<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<()> {
        let session = self.choose_session(console)?;
        let mut engine = GameEngine::new(session);
        let over = engine.play(console)?;
        finish_game(console, engine.get_session(), over, &self.saves_dir)?;
        console.say("")?;
        Ok(())
    }

    fn choose_session<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> Result<GameSession> {
        loop {
            let option = console.read_answer(MAIN_MENU)?;
            console.say("")?;
            let session = match option.as_str() {
                "1" => self.new_game(console)?,
                "2" => self.load_game(console)?,
                "3" => {
                    self.options(console)?;
                    None
                }
                _ => {
                    console.say("You didn't type it correctly.")?;
                    None
                }
            };
            if let Some(session) = session {
                return Ok(session);
            }
        }
    }

    /// Builds a new game from the config file. Config problems send the player back to the menu.
    pub fn new_game<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> Result<Option<GameSession>> {
        console.say("Creating a new game...")?;
        let config = match GameConfig::load_or_default(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "cannot start a new game");
                console.say(&format!("Error reading the configuration: {e}"))?;
                return Ok(None);
            }
        };
        let level = config.difficulty.resolve(&mut self.rng);
        console.say(&format!("Expertise Level: {level}"))?;
        match GameSession::new_game(&config.level_params(level), &mut self.rng) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                console.say(&format!("Error in the configuration: {e}"))?;
                Ok(None)
            }
        }
    }

    /// Lets the player pick a saved game. Without saves, a new game starts instead.
    pub fn load_game<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> Result<Option<GameSession>> {
        let saves = match list_saves(&self.saves_dir, &self.config_path) {
            Ok(saves) => saves,
            Err(e) => {
                console.say(&format!("Error loading information from the file: {e}"))?;
                return Ok(None);
            }
        };
        if saves.is_empty() {
            console.say("No game files found.")?;
            return self.new_game(console);
        }

        console.say("Choose a saved game file:")?;
        for (i, path) in saves.iter().enumerate() {
            let name = path.file_name().unwrap_or(path.as_os_str());
            console.say(&format!("{}. {}", i + 1, name.to_string_lossy()))?;
        }
        let path = loop {
            let answer = console.read_answer("Enter the number of the file you want to load: ")?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=saves.len()).contains(&n) => break &saves[n - 1],
                _ => console.say("Invalid choice. Please enter a listed number.")?,
            }
        };

        match read_save(path) {
            Ok(session) => {
                console.say(&format!(
                    "Game information loaded successfully from {}",
                    path.display()
                ))?;
                console.say("Starting the game...")?;
                Ok(Some(session))
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                console.say(&format!("Error loading information from the file: {e}"))?;
                Ok(None)
            }
        }
    }

    /// Options menu: edits the new-game values and writes them back to the config file.
    pub fn options<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<()> {
        let mut config = match GameConfig::load_or_default(&self.config_path) {
            Ok(config) => config,
            Err(e) => {
                console.say(&format!(
                    "Error accessing or modifying the configuration file: {e}"
                ))?;
                console.say("Showing default values; saving a change replaces the file.")?;
                GameConfig::default()
            }
        };

        loop {
            console.say("|---------------|")?;
            console.say("|  Game Config  | ")?;
            console.say("|---------------|\n")?;
            console.say("- New Game Values")?;
            console.say(&format!("| Bottle capacity: {}", config.capacity))?;
            console.say(&format!("| Total number of bottles: {}", config.total_containers))?;
            console.say(&format!("| Expertise: {}", config.difficulty))?;
            console.say("\n- New Game Options")?;
            console.say("a. Change bottle capacity")?;
            console.say("b. Change total number of bottles")?;
            console.say("c. Change expertise")?;
            console.say("d. Reset all New Game Values to default")?;
            console.say("\n- Other Options")?;
            console.say("z. Go Back\n")?;

            let choice = console.read_answer("Enter your choice: ")?.to_lowercase();
            let result: std::result::Result<&str, ConfigError> = match choice.as_str() {
                "a" => {
                    let answer = console.read_answer(&format!(
                        "Enter new bottle capacity (between {} and {}): ",
                        CAPACITY_BOUNDS.start(),
                        CAPACITY_BOUNDS.end()
                    ))?;
                    parse_number(&answer)
                        .and_then(|n| config.set_capacity(n))
                        .map(|_| "Bottle capacity updated successfully.")
                }
                "b" => {
                    let answer = console.read_answer(&format!(
                        "Enter new total number of bottles (between {} and {}): ",
                        BOTTLE_BOUNDS.start(),
                        BOTTLE_BOUNDS.end()
                    ))?;
                    parse_number(&answer)
                        .and_then(|n| config.set_total_containers(n))
                        .map(|_| "Total number of bottles updated successfully.")
                }
                "c" => {
                    let answer = console
                        .read_answer("Enter new expertise (options: random; 1; 2; 3; 4; 5): ")?;
                    answer
                        .parse::<Difficulty>()
                        .and_then(|d| config.set_difficulty(d))
                        .map(|_| "Expertise updated successfully.")
                }
                "d" => {
                    config = GameConfig::default();
                    Ok("Default configuration has been set successfully.")
                }
                "z" => return Ok(()),
                _ => {
                    console.say("Invalid choice. Please enter a valid option.")?;
                    continue;
                }
            };

            match result {
                Ok(message) => match config.save(&self.config_path) {
                    Ok(()) => {
                        info!(choice = %choice, "config updated");
                        console.say(message)?;
                    }
                    Err(e) => console.say(&format!(
                        "Error accessing or modifying the configuration file: {e}"
                    ))?,
                },
                Err(e) => console.say(&format!("Invalid input: {e}"))?,
            }
        }
    }
}

fn parse_number(answer: &str) -> std::result::Result<usize, ConfigError> {
    answer.trim().parse().map_err(|_| ConfigError::Malformed {
        line: 1,
        reason: format!("'{answer}' is not a number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::persistence::{save_path, write_save};
    use rand::SeedableRng;
    use std::io::Cursor;

    fn app(dir: &std::path::Path) -> App {
        App {
            config_path: dir.join(CONFIG_FILE_NAME),
            saves_dir: dir.to_path_buf(),
            rng: StdRng::seed_from_u64(11),
        }
    }

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn new_game_uses_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let mut config = GameConfig::default();
        config.set_total_containers(7).unwrap();
        config.set_difficulty(Difficulty::Level(2)).unwrap();
        config.save(&app.config_path).unwrap();

        let mut c = console("");
        let session = app.new_game(&mut c).unwrap().unwrap();
        assert_eq!(session.total_containers(), 7);
        assert_eq!(session.difficulty(), 2);
        let out = String::from_utf8(c.into_inner().1).unwrap();
        assert!(out.contains("Expertise Level: 2"));
    }

    #[test]
    fn broken_config_returns_to_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        std::fs::write(&app.config_path, "3\n10\nabc\nABC\nrandom\n").unwrap();
        let mut c = console("");
        assert!(app.new_game(&mut c).unwrap().is_none());
    }

    #[test]
    fn options_update_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let mut c = console("a\n30\na\n12\nc\n4\nq\nz\n");
        app.options(&mut c).unwrap();
        let config = GameConfig::load(&app.config_path).unwrap();
        assert_eq!(config.capacity, 12);
        assert_eq!(config.difficulty, Difficulty::Level(4));
        let out = String::from_utf8(c.into_inner().1).unwrap();
        assert!(out.contains("Invalid input"));
        assert!(out.contains("Bottle capacity updated successfully."));
        assert!(out.contains("Invalid choice. Please enter a valid option."));
    }

    #[test]
    fn load_game_lists_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let config = GameConfig::default();
        config.save(&app.config_path).unwrap();
        let session =
            GameSession::new_game(&config.level_params(3), &mut StdRng::seed_from_u64(1))
                .unwrap();
        write_save(&save_path(dir.path(), "alice"), &session).unwrap();

        let mut c = console("7\n1\n");
        let loaded = app.load_game(&mut c).unwrap().unwrap();
        assert_eq!(loaded, session);
        let out = String::from_utf8(c.into_inner().1).unwrap();
        assert!(out.contains("1. alice.txt"));
        assert!(!out.contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn no_saves_starts_a_new_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        let mut c = console("");
        let session = app.load_game(&mut c).unwrap();
        assert!(session.is_some());
        let out = String::from_utf8(c.into_inner().1).unwrap();
        assert!(out.contains("No game files found."));
    }
}

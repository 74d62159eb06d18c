use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::is_reserved_label;
use crate::error::PersistenceError;
use crate::model::{Bottle, Label};
use crate::session::GameSession;

pub const SAVE_EXTENSION: &str = "txt";

const BOTTLES_HEADER: &str = "Bottles:";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn is_comment(line: &str) -> bool {
    line == "#" || line.starts_with("# ")
}

impl GameSession {
    /// The saved-game text: five numbered records, then one `label:symbols` line per bottle.
    pub fn to_save_text(&self) -> String {
        let mut out = String::new();
        out.push_str(
            "# Attention - Changing any value in this database may break your save forever.\n\n",
        );
        out.push_str(&format!("# Bottle capacity\n{}\n\n", self.capacity()));
        out.push_str(&format!(
            "# Total number of bottles in the game\n{}\n\n",
            self.total_containers()
        ));
        out.push_str(&format!("# Expertise level\n{}\n\n", self.difficulty()));
        out.push_str(&format!("# Number of Errors\n{}\n\n", self.error_count()));
        out.push_str(&format!(
            "# Number of Full Bottles\n{}\n\n",
            self.solved_count()
        ));
        out.push_str(BOTTLES_HEADER);
        out.push('\n');
        for (label, bottle) in self.bottles() {
            out.push_str(&format!("{label}:{}\n", bottle.get_text_representation()));
        }
        out
    }

    pub fn from_save_text(text: &str) -> Result<GameSession, PersistenceError> {
        let mut records = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !is_comment(line));

        let mut number = |name: &'static str| -> Result<usize, PersistenceError> {
            let (line, value) = records.next().ok_or(PersistenceError::MissingRecord(name))?;
            value.parse().map_err(|_| PersistenceError::Malformed {
                line,
                reason: format!("expected the {name}, found '{value}'"),
            })
        };
        let capacity = number("bottle capacity")?;
        let total = number("number of bottles")?;
        let difficulty = number("expertise level")?;
        let error_count = number("number of errors")?;
        let stored_solved = number("number of full bottles")?;

        match records.next() {
            Some((_, line)) if line == BOTTLES_HEADER => {}
            Some((line, other)) => {
                return Err(PersistenceError::Malformed {
                    line,
                    reason: format!("expected '{BOTTLES_HEADER}', found '{other}'"),
                });
            }
            None => return Err(PersistenceError::MissingRecord("bottles")),
        }

        let mut bottles = Vec::with_capacity(total);
        for (line, record) in records {
            let Some((label, contents)) = record.split_once(':') else {
                return Err(PersistenceError::Malformed {
                    line,
                    reason: format!("expected 'label:symbols', found '{record}'"),
                });
            };
            let mut chars = label.trim().chars();
            let (Some(label), None) = (chars.next(), chars.next()) else {
                return Err(PersistenceError::Malformed {
                    line,
                    reason: format!("bottle label '{label}' must be a single character"),
                });
            };
            let label = Label::new(label);
            if is_reserved_label(label.as_char()) {
                return Err(PersistenceError::Malformed {
                    line,
                    reason: format!("bottle label '{label}' cannot be typed as a bottle choice"),
                });
            }
            let bottle = Bottle::new_from_repr(contents, capacity).ok_or_else(|| {
                PersistenceError::Malformed {
                    line,
                    reason: format!(
                        "bottle '{label}' must hold at most {capacity} single-character symbols"
                    ),
                }
            })?;
            bottles.push((label, bottle));
        }
        if bottles.len() != total {
            return Err(PersistenceError::Inconsistent(format!(
                "{} bottles listed, {total} expected",
                bottles.len()
            )));
        }

        let session = GameSession::from_bottles(capacity, difficulty, error_count, bottles)
            .map_err(|e| PersistenceError::Inconsistent(e.to_string()))?;
        if session.solved_count() != stored_solved {
            warn!(
                stored = stored_solved,
                actual = session.solved_count(),
                "stored full bottle count is stale, using the recomputed one"
            );
        }
        Ok(session)
    }
}

/// `<dir>/<name>.txt`
pub fn save_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{SAVE_EXTENSION}"))
}

pub fn write_save(path: &Path, session: &GameSession) -> Result<(), PersistenceError> {
    fs::write(path, session.to_save_text()).map_err(io_error(path))?;
    info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn read_save(path: &Path) -> Result<GameSession, PersistenceError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let session = GameSession::from_save_text(&text)?;
    info!(path = %path.display(), "game loaded");
    Ok(session)
}

/// Saved games in `dir`, sorted by name. The config file is not a save.
pub fn list_saves(dir: &Path, config_path: &Path) -> Result<Vec<PathBuf>, PersistenceError> {
    let config_name = config_path.file_name();
    let mut saves = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        let is_save = path.is_file()
            && path.extension().is_some_and(|ext| ext == SAVE_EXTENSION)
            && path.file_name() != config_name;
        if is_save {
            saves.push(path);
        }
    }
    saves.sort();
    debug!(dir = %dir.display(), count = saves.len(), "listed saves");
    Ok(saves)
}

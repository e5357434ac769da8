//! Persist the best score to disk (XDG config or ~/.config/flying-birdie).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "flying-birdie";
const FILENAME: &str = "best_score";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a score: {0:?}")]
    Parse(String),
}

/// Where the best score lives. `data_dir` overrides the XDG/HOME lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(data_dir: Option<&Path>) -> Self {
        let dir = data_dir.map_or_else(default_dir, Path::to_path_buf);
        Self {
            path: dir.join(FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a fresh install: best is 0.
    pub fn load(&self) -> Result<u32, HighScoreError> {
        match fs::read_to_string(&self.path) {
            Ok(s) => parse_best(&s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(source) => Err(HighScoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write the score, creating the directory if needed.
    pub fn save(&self, best: u32) -> Result<(), HighScoreError> {
        let io_err = |source| HighScoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, format!("{best}\n")).map_err(io_err)
    }
}

/// Config dir / flying-birdie.
fn default_dir() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR)
}

/// First line as a non-negative integer. Blank content counts as 0.
pub fn parse_best(s: &str) -> Result<u32, HighScoreError> {
    let line = s.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(0);
    }
    line.parse::<u32>()
        .map_err(|_| HighScoreError::Parse(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flying-birdie-test-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_parse_best() {
        assert_eq!(parse_best("42\n").unwrap(), 42);
        assert_eq!(parse_best("  7  ").unwrap(), 7);
        assert_eq!(parse_best("").unwrap(), 0);
        assert!(parse_best("-3").is_err());
        assert!(parse_best("lots").is_err());
    }

    #[test]
    fn test_missing_file_is_zero() {
        let dir = temp_dir("missing");
        let store = ScoreStore::new(Some(&dir));
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("save");
        let store = ScoreStore::new(Some(&dir.join("nested")));
        store.save(31).unwrap();
        assert_eq!(store.load().unwrap(), 31);
        store.save(44).unwrap();
        assert_eq!(store.load().unwrap(), 44);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = temp_dir("corrupt");
        let store = ScoreStore::new(Some(&dir));
        fs::create_dir_all(&dir).unwrap();
        fs::write(store.path(), "not a number").unwrap();
        assert!(matches!(store.load(), Err(HighScoreError::Parse(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}

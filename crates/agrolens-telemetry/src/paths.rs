//! Path resolution for agrolens state files

use std::path::PathBuf;

/// Environment variable that overrides the data directory
pub const HOME_ENV: &str = "AGROLENS_HOME";

/// Resolves standard paths under the agrolens data directory
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    /// Resolve the data directory from `AGROLENS_HOME`, falling back to `~/.agrolens`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(dir)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;
        Ok(Self::at(home.join(".agrolens")))
    }

    /// Use an explicit data directory
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// JSON config overrides
    pub fn config_file(&self) -> PathBuf {
        self.home.join("agrolens.json")
    }

    /// SQLite file backing the durable key/value store
    pub fn state_db(&self) -> PathBuf {
        self.home.join("state.db")
    }

    /// Append-only audit log of settled analyses
    pub fn analyses_file(&self) -> PathBuf {
        self.home.join("analyses.jsonl")
    }
}

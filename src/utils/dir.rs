use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APPLICATION_DIR: &str = ".mytimes";
const DATABASE_FILE: &str = "timesheets.db";
const LOG_DIR: &str = "logs";

/// `~/.mytimes`. Resolved through the user's home directory, which works the same on Linux and
/// Windows.
pub fn application_default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Couldn't find the home directory")?;
    Ok(home.join(APPLICATION_DIR))
}

/// Settings of a single run. The database location is the only thing a user can configure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
}

impl AppConfig {
    pub fn resolve(database_path: Option<PathBuf>) -> Result<Self> {
        let database_path = match database_path {
            Some(path) => path,
            None => application_default_path()?.join(DATABASE_FILE),
        };
        Ok(Self { database_path })
    }

    /// Logs are kept next to the database.
    pub fn log_dir(&self) -> PathBuf {
        self.database_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_DIR)
    }
}

//! Shared state and output helpers for command handlers.

use crate::{
    config::resolve_db_path,
    storage::ClubDatabase,
    Result,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Context containing the resources every handler needs
pub struct CommandContext {
    pub db: ClubDatabase,
    pub json: bool,
}

impl CommandContext {
    /// Open the database named by `--db`, the environment or the default path.
    pub fn open(db_path: Option<PathBuf>, json: bool) -> Result<Self> {
        let path = resolve_db_path(db_path);
        debug!(path = %path.display(), "Opening club database");
        let db = ClubDatabase::open(&path)?;
        Ok(Self { db, json })
    }

    /// Print `value` as pretty JSON when `--json` is set, otherwise run `human`.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Placeholder for empty optional columns in tables.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Format an attendance rate as a whole percentage.
pub fn percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{:.0}%", r * 100.0))
}

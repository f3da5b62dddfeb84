//! Store configuration.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file; created if missing
    pub db_path: PathBuf,
    /// Tables created (if absent) when the store opens
    #[serde(default)]
    pub schema: Schema,
    /// Enforce REFERENCES clauses (`PRAGMA foreign_keys`); off unless opted in
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

fn default_foreign_keys() -> bool {
    false
}

impl SqliteConfig {
    /// Create a new SQLite config with path and schema
    pub fn new(db_path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            db_path: db_path.into(),
            schema,
            foreign_keys: default_foreign_keys(),
        }
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}

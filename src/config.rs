use std::path::PathBuf;

use crate::db::schema::SCHEMA_STATEMENTS;

/// Application-level constants
pub const APP_NAME: &str = "Discobase";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output database written when no path is given
pub const DEFAULT_DATABASE_FILE: &str = "discobase.sqlite3";

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "discobase_lib=info,discobase=info,warn"
}

/// Where the DDL for the output database comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// The statements compiled into the binary.
    Bundled,
    /// A SQL script on disk, handed to SQLite whole.
    Script(PathBuf),
}

impl SchemaSource {
    pub fn statements(&self) -> Result<Vec<String>, std::io::Error> {
        match self {
            Self::Bundled => Ok(SCHEMA_STATEMENTS.iter().map(|s| s.to_string()).collect()),
            Self::Script(path) => Ok(vec![std::fs::read_to_string(path)?]),
        }
    }
}

/// Everything one database build needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub database_path: PathBuf,
    pub schema: SchemaSource,
}

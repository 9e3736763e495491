//! Read-only access to the Bear SQLite export.
//!
//! # Responsibility
//! - Open the external note store without ever writing to it.
//! - Classify open/bootstrap failures as `DataSourceUnavailable`.
//! - Provide schema probes shared by repositories and diagnostics.
//!
//! # Invariants
//! - Returned connections have `query_only=ON`.
//! - Core never migrates or mutates the external schema.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::open_note_store;
pub use schema::{list_tables, TableInfo};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Store file is missing, unreadable, or not a SQLite database.
    DataSourceUnavailable { path: PathBuf, reason: String },
    /// Required table is missing from the export.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    Sqlite(rusqlite::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataSourceUnavailable { path, reason } => write!(
                f,
                "note store unavailable at `{}`: {reason}",
                path.display()
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "note store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note store requires column `{column}` in table `{table}`"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::DataSourceUnavailable { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

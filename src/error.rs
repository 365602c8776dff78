// Error types for the task store and session

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The database file could not be opened
    #[error("Storage unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to create store directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Update requested for a task that was never persisted
    #[error("Task has no id; it must be created before it can be updated")]
    MissingId,

    #[error("Database schema version {found} is newer than supported version {expected}")]
    Downgrade { found: u32, expected: u32 },

    /// Schema versions start at 1
    #[error("Invalid schema version {0}; versions start at 1")]
    InvalidVersion(u32),

    #[error("Deadline timestamp out of range: {0}")]
    InvalidDeadline(i64),
}

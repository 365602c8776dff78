// SQLite-backed task store

use crate::error::{Error, Result};
use crate::task::{Deadline, Task, TaskId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Current schema version, kept in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// Database file name inside the store directory
pub const DB_FILE_NAME: &str = "tasklist.db";

const CREATE_TASKS: &str = "CREATE TABLE tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    deadline INTEGER,
    duration INTEGER,
    description TEXT,
    completed INTEGER
)";
const DROP_TASKS: &str = "DROP TABLE IF EXISTS tasks";
const INSERT_TASK: &str = "INSERT INTO tasks (name, deadline, duration, description, completed)
     VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_TASK: &str = "SELECT id, name, deadline, duration, description, completed FROM tasks WHERE id = ?1";
const SELECT_TASKS: &str = "SELECT id, name, deadline, duration, description, completed FROM tasks
     ORDER BY deadline DESC";
const UPDATE_TASK: &str = "UPDATE tasks
     SET name = ?1, deadline = ?2, duration = ?3, description = ?4, completed = ?5
     WHERE id = ?6";
const UPDATE_COMPLETED: &str = "UPDATE tasks SET completed = ?1 WHERE id = ?2";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";

/// Durable task table
///
/// Holds only the database location. Each operation opens its own
/// connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct Store {
    db_path: PathBuf,
    version: u32,
}

impl Store {
    /// Open or create a store in the given directory at [`SCHEMA_VERSION`]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_version(path, SCHEMA_VERSION)
    }

    /// Open or create a store at an explicit schema version
    ///
    /// An older on-disk version drops the `tasks` table and recreates it,
    /// discarding every stored task. A newer on-disk version is refused.
    /// Versions start at 1; 0 is what SQLite reports for an empty file.
    pub fn open_with_version<P: AsRef<Path>>(path: P, version: u32) -> Result<Self> {
        if version == 0 {
            return Err(Error::InvalidVersion(version));
        }
        let base_path = path.as_ref();
        fs::create_dir_all(base_path).map_err(|source| Error::CreateDir {
            path: base_path.to_path_buf(),
            source,
        })?;

        let store = Self {
            db_path: base_path.join(DB_FILE_NAME),
            version,
        };
        store.ensure_schema()?;

        Ok(store)
    }

    /// Path of the SQLite database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn schema_version(&self) -> u32 {
        self.version
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path).map_err(|source| Error::Unavailable {
            path: self.db_path.clone(),
            source,
        })
    }

    fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let found: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if found == self.version {
            debug!(version = found, "ensure_schema: up to date");
            return Ok(());
        }
        if found > self.version {
            return Err(Error::Downgrade {
                found,
                expected: self.version,
            });
        }

        let tx = conn.transaction()?;
        if found == 0 {
            info!(version = self.version, "Creating tasks schema");
        } else {
            warn!(
                from = found,
                to = self.version,
                "Schema version changed, dropping tasks table; existing tasks are lost"
            );
        }
        tx.execute(DROP_TASKS, [])?;
        tx.execute(CREATE_TASKS, [])?;
        tx.pragma_update(None, "user_version", self.version)?;
        tx.commit()?;

        Ok(())
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Insert a task and return its new id. Any id on `task` is ignored.
    pub fn create(&self, task: &Task) -> Result<TaskId> {
        let conn = self.connect()?;
        conn.execute(
            INSERT_TASK,
            params![task.name, task.deadline, task.duration, task.description, task.completed as i64],
        )?;
        let id = TaskId::new(conn.last_insert_rowid());
        debug!(%id, "create: inserted task");

        Ok(id)
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let conn = self.connect()?;
        let task = conn.query_row(SELECT_TASK, [id], task_from_row).optional()?;

        Ok(task)
    }

    /// Every task, latest deadline first
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(SELECT_TASKS)?;
        let tasks = stmt.query_map([], task_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = tasks.len(), "list_all: fetched tasks");

        Ok(tasks)
    }

    /// Replace every mutable field of an existing task
    ///
    /// Returns the number of rows affected; 0 means no task has that id.
    pub fn update(&self, task: &Task) -> Result<usize> {
        let id = task.id.ok_or(Error::MissingId)?;
        let conn = self.connect()?;
        let rows = conn.execute(
            UPDATE_TASK,
            params![task.name, task.deadline, task.duration, task.description, task.completed as i64, id],
        )?;
        debug!(%id, rows, "update: called");

        Ok(rows)
    }

    /// Returns the number of rows removed (0 or 1)
    pub fn delete(&self, id: TaskId) -> Result<usize> {
        let conn = self.connect()?;
        let rows = conn.execute(DELETE_TASK, [id])?;
        debug!(%id, rows, "delete: called");

        Ok(rows)
    }

    /// Set only the completion flag of a task
    pub fn set_completed(&self, id: TaskId, completed: bool) -> Result<usize> {
        let conn = self.connect()?;
        let rows = conn.execute(UPDATE_COMPLETED, params![completed as i64, id])?;
        debug!(%id, completed, rows, "set_completed: called");

        Ok(rows)
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        deadline: row.get::<_, Deadline>(2)?,
        duration: row.get(3)?,
        description: row.get(4)?,
        completed: row.get::<_, i64>(5)? == 1,
    })
}

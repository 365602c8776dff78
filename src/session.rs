// In-memory mirror of the store for presentation code

use crate::error::{Error, Result};
use crate::store::Store;
use crate::task::{Task, TaskId};
use tracing::debug;

/// Ordered copy of every stored task, latest deadline first
///
/// The list is never patched in place: each mutation goes to the store and
/// is followed by a full [`reload`](Session::reload). A failed mutation
/// returns before reloading, so the previous list stays as it was.
pub struct Session<'a> {
    store: &'a Store,
    tasks: Vec<Task>,
}

impl<'a> Session<'a> {
    /// Session with an empty list; call [`reload`](Session::reload) to populate it
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            tasks: Vec::new(),
        }
    }

    pub fn load(store: &'a Store) -> Result<Self> {
        let mut session = Self::new(store);
        session.reload()?;
        Ok(session)
    }

    pub fn store(&self) -> &'a Store {
        self.store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task at a list position
    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replace the whole list with a fresh read from the store
    pub fn reload(&mut self) -> Result<&[Task]> {
        self.tasks = self.store.list_all()?;
        debug!(count = self.tasks.len(), "reload: replaced task list");
        Ok(&self.tasks)
    }

    pub fn add_and_reload(&mut self, task: &Task) -> Result<TaskId> {
        let id = self.store.create(task)?;
        self.reload()?;
        Ok(id)
    }

    /// Update a persisted task; a task without an id is rejected, never created
    pub fn update_and_reload(&mut self, task: &Task) -> Result<usize> {
        if task.id.is_none() {
            return Err(Error::MissingId);
        }
        let rows = self.store.update(task)?;
        self.reload()?;
        Ok(rows)
    }

    pub fn delete_and_reload(&mut self, id: TaskId) -> Result<usize> {
        let rows = self.store.delete(id)?;
        self.reload()?;
        Ok(rows)
    }

    pub fn toggle_completion_and_reload(&mut self, id: TaskId, completed: bool) -> Result<usize> {
        let rows = self.store.set_completed(id, completed)?;
        self.reload()?;
        Ok(rows)
    }
}

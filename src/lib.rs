// Tasklist - single-table to-do list persisted in SQLite

pub mod error;
pub mod form;
pub mod session;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use form::{FormError, TaskForm};
pub use session::Session;
pub use store::{SCHEMA_VERSION, Store};
pub use task::{Deadline, Task, TaskId};

//! SQLite storage implementation for tasks.

mod model;
mod repository;

pub use model::{TaskChangesetDB, TaskDB};
pub use repository::TaskRepository;

pub(crate) use repository::{is_member_tx, load_task_for_tx};

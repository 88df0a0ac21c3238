//! SQLite storage implementation for tags.

mod model;
mod repository;

pub use model::{TagDB, TaskTagDB};
pub use repository::TagRepository;

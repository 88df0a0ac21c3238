//! Profile storage: users, usernames and password hashes.

mod model;
mod repository;

pub use model::ProfileDB;
pub use repository::ProfileRepository;

pub(crate) use repository::{find_by_username_tx, profile_exists_tx};

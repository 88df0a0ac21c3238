//! SQLite storage implementation for friendships and shared boards.

mod model;
mod repository;

pub use model::{BoardMemberDB, FriendRequestDB, FriendshipDB, SharedBoardDB};
pub use repository::RelationshipRepository;

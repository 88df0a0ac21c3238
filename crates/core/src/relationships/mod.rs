//! Relationships module - friend requests, friendships and shared boards.

mod procedure;
mod relationships_errors;
mod relationships_model;
mod relationships_service;
mod relationships_traits;

#[cfg(test)]
mod relationships_service_tests;

pub use procedure::{ProcedureCode, ProcedureError};
pub use relationships_errors::RelationshipError;
pub use relationships_model::{
    AcceptedRequest, BoardMember, FriendRequest, FriendRequestStatus, FriendWithProfile,
    Friendship, PendingRequest, SharedBoard,
};
pub use relationships_service::{ensure_board_member, RelationshipService};
pub use relationships_traits::{RelationshipRepositoryTrait, RelationshipServiceTrait};

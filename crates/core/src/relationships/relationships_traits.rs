use async_trait::async_trait;

use super::relationships_model::{
    AcceptedRequest, FriendRequest, FriendWithProfile, PendingRequest, SharedBoard,
};
use crate::errors::Result;

/// Named procedures and queries of the platform for friends and boards.
///
/// Mutations run as one transaction each and report precondition failures
/// as [`crate::Error::Procedure`].
#[async_trait]
pub trait RelationshipRepositoryTrait: Send + Sync {
    async fn send_friend_request(
        &self,
        sender_id: &str,
        receiver_username: &str,
    ) -> Result<FriendRequest>;
    async fn accept_friend_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<AcceptedRequest>;
    async fn reject_friend_request(&self, request_id: &str, user_id: &str)
        -> Result<FriendRequest>;
    /// Removes both directions of the friendship. Returns the rows deleted.
    async fn delete_friend(&self, user_id: &str, friend_id: &str) -> Result<usize>;
    fn list_friends(&self, user_id: &str) -> Result<Vec<FriendWithProfile>>;
    fn list_pending_requests(&self, receiver_id: &str) -> Result<Vec<PendingRequest>>;
    async fn create_shared_board(
        &self,
        creator_id: &str,
        name: &str,
        friend_id: &str,
    ) -> Result<SharedBoard>;
    fn get_user_boards(&self, user_id: &str) -> Result<Vec<SharedBoard>>;
    fn get_board(&self, board_id: &str) -> Result<Option<SharedBoard>>;
    fn is_board_member(&self, board_id: &str, user_id: &str) -> Result<bool>;
}

/// Trait for relationship service operations
#[async_trait]
pub trait RelationshipServiceTrait: Send + Sync {
    async fn send_friend_request(
        &self,
        sender_id: &str,
        receiver_username: &str,
    ) -> Result<FriendRequest>;
    async fn accept_friend_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<AcceptedRequest>;
    async fn reject_friend_request(&self, request_id: &str, user_id: &str)
        -> Result<FriendRequest>;
    async fn remove_friend(&self, user_id: &str, friend_id: &str) -> Result<()>;
    fn list_friends(&self, user_id: &str) -> Result<Vec<FriendWithProfile>>;
    fn list_pending_requests(&self, user_id: &str) -> Result<Vec<PendingRequest>>;
    async fn create_shared_board(
        &self,
        creator_id: &str,
        name: &str,
        friend_id: &str,
    ) -> Result<SharedBoard>;
    fn list_boards(&self, user_id: &str) -> Result<Vec<SharedBoard>>;
    fn ensure_board_member(&self, board_id: &str, user_id: &str) -> Result<SharedBoard>;
}

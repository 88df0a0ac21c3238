use std::sync::Arc;

use log::{debug, info};

use super::relationships_errors::{gate, RelationshipError};
use super::relationships_model::{
    AcceptedRequest, FriendRequest, FriendWithProfile, PendingRequest, SharedBoard,
};
use super::relationships_traits::{RelationshipRepositoryTrait, RelationshipServiceTrait};
use crate::errors::{Error, Result};

/// Gate in front of the friend and board procedures.
///
/// Performs the checks that need no state, then lets the procedure decide
/// the rest. Every failure is mapped exactly once on the way out.
pub struct RelationshipService {
    repository: Arc<dyn RelationshipRepositoryTrait>,
}

impl RelationshipService {
    pub fn new(repository: Arc<dyn RelationshipRepositoryTrait>) -> Self {
        Self { repository }
    }
}

/// Resolves the board and checks that `user_id` is one of its members.
pub fn ensure_board_member(
    repository: &dyn RelationshipRepositoryTrait,
    board_id: &str,
    user_id: &str,
) -> Result<SharedBoard> {
    let board = repository
        .get_board(board_id)?
        .ok_or_else(|| RelationshipError::NotFound(format!("Board {} not found", board_id)))?;
    if !repository.is_board_member(board_id, user_id)? {
        return Err(RelationshipError::Forbidden(format!(
            "Forbidden: not a member of board {}",
            board_id
        ))
        .into());
    }
    Ok(board)
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::missing_field(field));
    }
    Ok(trimmed)
}

#[async_trait::async_trait]
impl RelationshipServiceTrait for RelationshipService {
    async fn send_friend_request(
        &self,
        sender_id: &str,
        receiver_username: &str,
    ) -> Result<FriendRequest> {
        let receiver_username = required(receiver_username, "receiver_username")?;
        debug!(
            "Sending friend request from {} to '{}'",
            sender_id, receiver_username
        );
        self.repository
            .send_friend_request(sender_id, receiver_username)
            .await
            .map_err(gate)
    }

    async fn accept_friend_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<AcceptedRequest> {
        let request_id = required(request_id, "request_id")?;
        let accepted = self
            .repository
            .accept_friend_request(request_id, user_id)
            .await
            .map_err(gate)?;
        info!(
            "Friend request {} accepted, {} friendship rows created",
            accepted.request.id,
            accepted.friendships.len()
        );
        Ok(accepted)
    }

    async fn reject_friend_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<FriendRequest> {
        let request_id = required(request_id, "request_id")?;
        self.repository
            .reject_friend_request(request_id, user_id)
            .await
            .map_err(gate)
    }

    async fn remove_friend(&self, user_id: &str, friend_id: &str) -> Result<()> {
        let friend_id = required(friend_id, "friend_id")?;
        if friend_id == user_id {
            return Err(RelationshipError::SelfReference(
                "You cannot unfriend yourself".to_string(),
            )
            .into());
        }
        let removed = self
            .repository
            .delete_friend(user_id, friend_id)
            .await
            .map_err(gate)?;
        debug!("Removed {} friendship rows for {}", removed, user_id);
        Ok(())
    }

    fn list_friends(&self, user_id: &str) -> Result<Vec<FriendWithProfile>> {
        self.repository.list_friends(user_id).map_err(gate)
    }

    fn list_pending_requests(&self, user_id: &str) -> Result<Vec<PendingRequest>> {
        self.repository.list_pending_requests(user_id).map_err(gate)
    }

    async fn create_shared_board(
        &self,
        creator_id: &str,
        name: &str,
        friend_id: &str,
    ) -> Result<SharedBoard> {
        let name = required(name, "name")?;
        let friend_id = required(friend_id, "friend_id")?;
        if friend_id == creator_id {
            return Err(RelationshipError::SelfReference(
                "You cannot share a board with yourself".to_string(),
            )
            .into());
        }
        let board = self
            .repository
            .create_shared_board(creator_id, name, friend_id)
            .await
            .map_err(gate)?;
        info!("Created shared board {} for {} and {}", board.id, creator_id, friend_id);
        Ok(board)
    }

    fn list_boards(&self, user_id: &str) -> Result<Vec<SharedBoard>> {
        self.repository.get_user_boards(user_id).map_err(gate)
    }

    fn ensure_board_member(&self, board_id: &str, user_id: &str) -> Result<SharedBoard> {
        ensure_board_member(self.repository.as_ref(), board_id, user_id).map_err(gate)
    }
}

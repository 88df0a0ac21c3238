#[cfg(test)]
mod tests {
    use crate::errors::{Error, ErrorKind, Result};
    use crate::relationships::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // --- Mock procedures ---
    #[derive(Default)]
    struct MockRelationshipRepository {
        calls: AtomicUsize,
        failure: Mutex<Option<ProcedureError>>,
        boards: Mutex<Vec<(SharedBoard, Vec<String>)>>,
    }

    impl MockRelationshipRepository {
        fn failing_with(code: ProcedureCode, message: &str) -> Self {
            let repo = Self::default();
            *repo.failure.lock().unwrap() = Some(ProcedureError::new(code, message));
            repo
        }

        fn add_board(&self, id: &str, members: &[&str]) {
            let board = SharedBoard {
                id: id.to_string(),
                name: "Groceries".to_string(),
                created_by: members[0].to_string(),
                created_at: Utc::now().naive_utc(),
            };
            self.boards
                .lock()
                .unwrap()
                .push((board, members.iter().map(|m| m.to_string()).collect()));
        }

        fn procedure(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failure.lock().unwrap().clone() {
                Some(err) => Err(Error::Procedure(err)),
                None => Ok(()),
            }
        }

        fn request(&self, sender: &str, receiver: &str, status: FriendRequestStatus) -> FriendRequest {
            let now = Utc::now().naive_utc();
            FriendRequest {
                id: "req-1".to_string(),
                sender_id: sender.to_string(),
                receiver_id: receiver.to_string(),
                status,
                created_at: now,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl RelationshipRepositoryTrait for MockRelationshipRepository {
        async fn send_friend_request(
            &self,
            sender_id: &str,
            receiver_username: &str,
        ) -> Result<FriendRequest> {
            self.procedure()?;
            Ok(self.request(sender_id, receiver_username, FriendRequestStatus::Pending))
        }

        async fn accept_friend_request(
            &self,
            _request_id: &str,
            user_id: &str,
        ) -> Result<AcceptedRequest> {
            self.procedure()?;
            let now = Utc::now().naive_utc();
            Ok(AcceptedRequest {
                request: self.request("alice", user_id, FriendRequestStatus::Accepted),
                friendships: vec![
                    Friendship {
                        user_id: "alice".to_string(),
                        friend_id: user_id.to_string(),
                        created_at: now,
                    },
                    Friendship {
                        user_id: user_id.to_string(),
                        friend_id: "alice".to_string(),
                        created_at: now,
                    },
                ],
            })
        }

        async fn reject_friend_request(
            &self,
            _request_id: &str,
            user_id: &str,
        ) -> Result<FriendRequest> {
            self.procedure()?;
            Ok(self.request("alice", user_id, FriendRequestStatus::Rejected))
        }

        async fn delete_friend(&self, _user_id: &str, _friend_id: &str) -> Result<usize> {
            self.procedure()?;
            Ok(2)
        }

        fn list_friends(&self, _user_id: &str) -> Result<Vec<FriendWithProfile>> {
            Ok(Vec::new())
        }

        fn list_pending_requests(&self, _receiver_id: &str) -> Result<Vec<PendingRequest>> {
            Ok(Vec::new())
        }

        async fn create_shared_board(
            &self,
            creator_id: &str,
            name: &str,
            friend_id: &str,
        ) -> Result<SharedBoard> {
            self.procedure()?;
            let board = SharedBoard {
                id: "board-1".to_string(),
                name: name.to_string(),
                created_by: creator_id.to_string(),
                created_at: Utc::now().naive_utc(),
            };
            self.boards.lock().unwrap().push((
                board.clone(),
                vec![creator_id.to_string(), friend_id.to_string()],
            ));
            Ok(board)
        }

        fn get_user_boards(&self, user_id: &str) -> Result<Vec<SharedBoard>> {
            Ok(self
                .boards
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, members)| members.iter().any(|m| m == user_id))
                .map(|(board, _)| board.clone())
                .collect())
        }

        fn get_board(&self, board_id: &str) -> Result<Option<SharedBoard>> {
            Ok(self
                .boards
                .lock()
                .unwrap()
                .iter()
                .find(|(board, _)| board.id == board_id)
                .map(|(board, _)| board.clone()))
        }

        fn is_board_member(&self, board_id: &str, user_id: &str) -> Result<bool> {
            Ok(self
                .boards
                .lock()
                .unwrap()
                .iter()
                .any(|(board, members)| board.id == board_id && members.iter().any(|m| m == user_id)))
        }
    }

    #[tokio::test]
    async fn test_blank_username_fails_before_procedure() {
        let repo = Arc::new(MockRelationshipRepository::default());
        let service = RelationshipService::new(repo.clone());

        let err = service.send_friend_request("alice", "   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);

        let request = service.send_friend_request("alice", " bob ").await.unwrap();
        assert_eq!(request.receiver_id, "bob");
        assert_eq!(request.status, FriendRequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_request_is_conflict() {
        let repo = Arc::new(MockRelationshipRepository::failing_with(
            ProcedureCode::AlreadyExists,
            "Friend request already exists",
        ));
        let service = RelationshipService::new(repo);

        let err = service.send_friend_request("alice", "bob").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Relationship(RelationshipError::AlreadyFriends(_))
        ));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_reaccepting_is_conflict() {
        let repo = Arc::new(MockRelationshipRepository::failing_with(
            ProcedureCode::InvalidState,
            "Request is not pending",
        ));
        let service = RelationshipService::new(repo);
        let err = service.accept_friend_request("req-1", "bob").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "Request is not pending");
    }

    #[tokio::test]
    async fn test_accept_returns_both_directions() {
        let service = RelationshipService::new(Arc::new(MockRelationshipRepository::default()));
        let accepted = service.accept_friend_request("req-1", "bob").await.unwrap();
        assert_eq!(accepted.request.status, FriendRequestStatus::Accepted);
        assert_eq!(accepted.friendships.len(), 2);
    }

    #[tokio::test]
    async fn test_board_with_self_is_rejected_locally() {
        let repo = Arc::new(MockRelationshipRepository::default());
        let service = RelationshipService::new(repo.clone());

        let err = service
            .create_shared_board("alice", "Chores", "alice")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = service
            .create_shared_board("alice", "  ", "bob")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_board_with_non_friend_is_forbidden() {
        let repo = Arc::new(MockRelationshipRepository::failing_with(
            ProcedureCode::NotFriends,
            "Users are not friends",
        ));
        let service = RelationshipService::new(repo);
        let err = service
            .create_shared_board("alice", "Chores", "carol")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_created_board_is_listed_for_both_members() {
        let service = RelationshipService::new(Arc::new(MockRelationshipRepository::default()));
        let board = service
            .create_shared_board("alice", " Chores ", "bob")
            .await
            .unwrap();
        assert_eq!(board.name, "Chores");
        assert_eq!(service.list_boards("alice").unwrap(), vec![board.clone()]);
        assert_eq!(service.list_boards("bob").unwrap(), vec![board]);
        assert!(service.list_boards("carol").unwrap().is_empty());
    }

    #[test]
    fn test_board_membership_checks() {
        let repo = Arc::new(MockRelationshipRepository::default());
        repo.add_board("board-1", &["alice", "bob"]);
        let service = RelationshipService::new(repo);

        assert!(service.ensure_board_member("board-1", "bob").is_ok());
        assert_eq!(
            service
                .ensure_board_member("board-1", "carol")
                .unwrap_err()
                .kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            service
                .ensure_board_member("missing", "alice")
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_unfriending_self_is_rejected() {
        let service = RelationshipService::new(Arc::new(MockRelationshipRepository::default()));
        let err = service.remove_friend("alice", "alice").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        service.remove_friend("alice", "bob").await.unwrap();
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, ErrorKind, Result};
    use crate::ordering::{MoveDirection, SortSwap};
    use crate::relationships::{
        AcceptedRequest, FriendRequest, FriendWithProfile, PendingRequest,
        RelationshipRepositoryTrait, SharedBoard,
    };
    use crate::tasks::{
        NewTask, Priority, Task, TaskFilter, TaskRepositoryTrait, TaskService, TaskServiceTrait,
        TaskUpdate,
    };
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn task(id: &str, owner: &str, sort_order: i64, priority: Priority) -> Task {
        let at = base_time() + Duration::minutes(sort_order);
        Task {
            id: id.to_string(),
            user_id: owner.to_string(),
            shared_board_id: None,
            title: id.to_uppercase(),
            description: None,
            priority,
            completed: false,
            completed_at: None,
            sort_order,
            created_at: at,
            updated_at: at,
        }
    }

    // --- Mock TaskRepository ---
    #[derive(Default)]
    struct MockTaskRepository {
        tasks: Mutex<Vec<Task>>,
        swaps: AtomicUsize,
        /// Simulates another client rewriting this task's key first.
        concurrent_edit: Mutex<Option<(String, i64)>>,
    }

    impl MockTaskRepository {
        fn with(tasks: Vec<Task>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                ..Default::default()
            }
        }

        fn order(&self, owner: &str) -> Vec<String> {
            let mut tasks = self.list_personal(owner).unwrap();
            crate::ordering::sort_tasks(&mut tasks);
            tasks.into_iter().map(|t| t.id).collect()
        }
    }

    #[async_trait]
    impl TaskRepositoryTrait for MockTaskRepository {
        fn list_personal(&self, user_id: &str) -> Result<Vec<Task>> {
            Ok(self
                .tasks
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id == user_id && t.is_personal())
                .cloned()
                .collect())
        }

        fn list_board(&self, board_id: &str) -> Result<Vec<Task>> {
            Ok(self
                .tasks
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.shared_board_id.as_deref() == Some(board_id))
                .cloned()
                .collect())
        }

        fn get_task(&self, task_id: &str) -> Result<Task> {
            self.tasks
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == task_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(task_id.to_string())))
        }

        async fn create_task(&self, user_id: &str, new_task: NewTask) -> Result<Task> {
            let mut created = task("new", user_id, new_task.sort_order.unwrap_or(0), Priority::Medium);
            created.title = new_task.title;
            created.priority = new_task.priority.unwrap_or_default();
            created.shared_board_id = new_task.shared_board_id;
            self.tasks.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update_task(
            &self,
            _user_id: &str,
            _task_id: &str,
            _update: TaskUpdate,
        ) -> Result<Task> {
            unimplemented!()
        }

        async fn delete_task(&self, _user_id: &str, _task_id: &str) -> Result<Task> {
            unimplemented!()
        }

        async fn swap_sort_order(&self, _user_id: &str, swap: SortSwap) -> Result<Vec<Task>> {
            self.swaps.fetch_add(1, Ordering::SeqCst);
            let mut tasks = self.tasks.lock().unwrap();
            if let Some((id, key)) = self.concurrent_edit.lock().unwrap().take() {
                if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
                    t.sort_order = key;
                }
            }
            let mut updated = Vec::new();
            for change in swap.changes() {
                if let Some(t) = tasks
                    .iter_mut()
                    .find(|t| t.id == change.task_id && t.sort_order == change.from)
                {
                    t.sort_order = change.to;
                    updated.push(t.clone());
                }
            }
            Ok(updated)
        }
    }

    // --- Mock board membership ---
    #[derive(Default)]
    struct MockBoards {
        members: Vec<(String, String)>,
    }

    #[async_trait]
    impl RelationshipRepositoryTrait for MockBoards {
        async fn send_friend_request(&self, _: &str, _: &str) -> Result<FriendRequest> {
            unimplemented!()
        }
        async fn accept_friend_request(&self, _: &str, _: &str) -> Result<AcceptedRequest> {
            unimplemented!()
        }
        async fn reject_friend_request(&self, _: &str, _: &str) -> Result<FriendRequest> {
            unimplemented!()
        }
        async fn delete_friend(&self, _: &str, _: &str) -> Result<usize> {
            unimplemented!()
        }
        fn list_friends(&self, _: &str) -> Result<Vec<FriendWithProfile>> {
            unimplemented!()
        }
        fn list_pending_requests(&self, _: &str) -> Result<Vec<PendingRequest>> {
            unimplemented!()
        }
        async fn create_shared_board(&self, _: &str, _: &str, _: &str) -> Result<SharedBoard> {
            unimplemented!()
        }
        fn get_user_boards(&self, _: &str) -> Result<Vec<SharedBoard>> {
            unimplemented!()
        }
        fn get_board(&self, board_id: &str) -> Result<Option<SharedBoard>> {
            Ok(self
                .members
                .iter()
                .find(|(b, _)| b == board_id)
                .map(|(b, creator)| SharedBoard {
                    id: b.clone(),
                    name: "Board".to_string(),
                    created_by: creator.clone(),
                    created_at: base_time(),
                }))
        }
        fn is_board_member(&self, board_id: &str, user_id: &str) -> Result<bool> {
            Ok(self
                .members
                .iter()
                .any(|(b, u)| b == board_id && u == user_id))
        }
    }

    fn service(repo: Arc<MockTaskRepository>) -> TaskService {
        TaskService::new(repo, Arc::new(MockBoards::default()))
    }

    #[tokio::test]
    async fn test_move_up_swaps_adjacent_pair() {
        let repo = Arc::new(MockTaskRepository::with(vec![
            task("t1", "alice", 0, Priority::Medium),
            task("t2", "alice", 1, Priority::Medium),
            task("t3", "alice", 2, Priority::Medium),
        ]));
        let service = service(repo.clone());

        let updated = service
            .move_task("alice", "t2", MoveDirection::Up, TaskFilter::All)
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(repo.order("alice"), vec!["t2", "t1", "t3"]);

        let listed = service
            .list_personal_tasks("alice", TaskFilter::All)
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1", "t3"]);
    }

    #[tokio::test]
    async fn test_move_at_boundary_is_noop() {
        let repo = Arc::new(MockTaskRepository::with(vec![
            task("t1", "alice", 0, Priority::Medium),
            task("t2", "alice", 1, Priority::Medium),
        ]));
        let service = service(repo.clone());

        let updated = service
            .move_task("alice", "t1", MoveDirection::Up, TaskFilter::All)
            .await
            .unwrap();
        assert!(updated.is_empty());
        assert_eq!(repo.swaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_move_uses_filtered_neighbour() {
        let repo = Arc::new(MockTaskRepository::with(vec![
            task("a", "alice", 0, Priority::High),
            task("b", "alice", 1, Priority::Low),
            task("c", "alice", 2, Priority::High),
        ]));
        let service = service(repo.clone());

        service
            .move_task("alice", "c", MoveDirection::Up, TaskFilter::High)
            .await
            .unwrap();
        assert_eq!(repo.order("alice"), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_partial_swap_requires_reconcile() {
        let repo = Arc::new(MockTaskRepository::with(vec![
            task("t1", "alice", 0, Priority::Medium),
            task("t2", "alice", 1, Priority::Medium),
        ]));
        *repo.concurrent_edit.lock().unwrap() = Some(("t1".to_string(), 7));
        let service = service(repo);

        let err = service
            .move_task("alice", "t2", MoveDirection::Up, TaskFilter::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReconcileRequired(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_foreign_personal_task_is_forbidden() {
        let repo = Arc::new(MockTaskRepository::with(vec![
            task("t1", "alice", 0, Priority::Medium),
            task("t2", "alice", 1, Priority::Medium),
        ]));
        let service = service(repo);

        let err = service
            .move_task("mallory", "t2", MoveDirection::Up, TaskFilter::All)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_board_tasks_require_membership() {
        let mut shared = task("s1", "alice", 0, Priority::Medium);
        shared.shared_board_id = Some("board-1".to_string());
        let repo = Arc::new(MockTaskRepository::with(vec![shared]));
        let boards = MockBoards {
            members: vec![
                ("board-1".to_string(), "alice".to_string()),
                ("board-1".to_string(), "bob".to_string()),
            ],
        };
        let service = TaskService::new(repo, Arc::new(boards));

        assert_eq!(
            service
                .list_board_tasks("bob", "board-1", TaskFilter::All)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            service
                .list_board_tasks("carol", "board-1", TaskFilter::All)
                .unwrap_err()
                .kind(),
            ErrorKind::Forbidden
        );

        let err = service
            .create_task(
                "carol",
                NewTask {
                    title: "Sneaky".to_string(),
                    shared_board_id: Some("board-1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let repo = Arc::new(MockTaskRepository::default());
        let service = service(repo.clone());

        let err = service
            .create_task("alice", NewTask::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let created = service
            .create_task(
                "alice",
                NewTask {
                    title: "  Water plants ".to_string(),
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.title, "Water plants");
        assert_eq!(created.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_task() {
        let repo = Arc::new(MockTaskRepository::with(vec![task(
            "t1",
            "alice",
            0,
            Priority::Low,
        )]));
        let service = service(repo);
        let unchanged = service
            .update_task("alice", "t1", TaskUpdate::default())
            .await
            .unwrap();
        assert_eq!(unchanged.priority, Priority::Low);
    }
}

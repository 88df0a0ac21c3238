#![allow(dead_code)]

use std::sync::Arc;

use tempfile::{tempdir, TempDir};
use twodo_core::profiles::{NewProfile, Profile, ProfileRepositoryTrait};
use twodo_core::realtime::{ChangeHub, ChangeSink};
use twodo_core::relationships::RelationshipRepositoryTrait;
use twodo_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, DbPool, ProfileRepository,
    RelationshipRepository, TagRepository, TaskRepository, WriteHandle,
};

/// A migrated database in a temp directory, with every repository wired to
/// one change hub.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub hub: ChangeHub,
    pub profiles: ProfileRepository,
    pub relationships: Arc<RelationshipRepository>,
    pub tasks: Arc<TaskRepository>,
    pub tags: TagRepository,
    _dir: TempDir,
}

pub async fn setup() -> TestDb {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db").to_string_lossy().to_string();

    init(&db_path).expect("Failed to init database");
    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());

    let hub = ChangeHub::new(64);
    let events: Arc<dyn ChangeSink> = Arc::new(hub.clone());

    TestDb {
        profiles: ProfileRepository::new(pool.clone(), writer.clone()),
        relationships: Arc::new(RelationshipRepository::new(
            pool.clone(),
            writer.clone(),
            events.clone(),
        )),
        tasks: Arc::new(TaskRepository::new(pool.clone(), writer.clone(), events)),
        tags: TagRepository::new(pool.clone(), writer.clone()),
        pool,
        writer,
        hub,
        _dir: dir,
    }
}

impl TestDb {
    pub async fn register(&self, username: &str) -> Profile {
        self.profiles
            .create_profile(
                NewProfile {
                    username: username.to_string(),
                    ..Default::default()
                },
                "not-a-real-hash".to_string(),
            )
            .await
            .expect("Failed to create profile")
    }

    /// Sends a friend request and returns its id.
    pub async fn send_request(&self, sender_id: &str, receiver: &str) -> String {
        self.relationships
            .send_friend_request(sender_id, receiver)
            .await
            .expect("Failed to send friend request")
            .id
    }

    pub async fn accept_request(&self, request_id: &str, user_id: &str) {
        self.relationships
            .accept_friend_request(request_id, user_id)
            .await
            .expect("Failed to accept friend request");
    }

    /// Creates a board and returns its id.
    pub async fn board(&self, creator_id: &str, name: &str, friend_id: &str) -> String {
        self.relationships
            .create_shared_board(creator_id, name, friend_id)
            .await
            .expect("Failed to create board")
            .id
    }
}

use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use twodo_core::{
    profiles::{ProfileService, ProfileServiceTrait},
    realtime::{ChangeHub, ChangeSink},
    relationships::{RelationshipService, RelationshipServiceTrait},
    tags::{TagService, TagServiceTrait},
    tasks::{TaskService, TaskServiceTrait},
};
use twodo_storage_sqlite::{
    db, ProfileRepository, RelationshipRepository, TagRepository, TaskRepository,
};

use crate::{auth::SessionManager, config::Config};

pub struct AppState {
    pub profile_service: Arc<dyn ProfileServiceTrait>,
    pub task_service: Arc<dyn TaskServiceTrait>,
    pub relationship_service: Arc<dyn RelationshipServiceTrait>,
    pub tag_service: Arc<dyn TagServiceTrait>,
    /// Committed row changes, fanned out to realtime subscribers.
    pub change_hub: ChangeHub,
    pub sessions: Arc<SessionManager>,
}

pub fn init_tracing() {
    let log_format = std::env::var("TWODO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Tests build several apps in one process; only the first subscriber sticks.
    let _ = if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let pool = db::create_pool(&config.db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let change_hub = ChangeHub::new(config.feed_capacity);
    let events: Arc<dyn ChangeSink> = Arc::new(change_hub.clone());

    let profile_repository = Arc::new(ProfileRepository::new(pool.clone(), writer.clone()));
    let relationship_repository = Arc::new(RelationshipRepository::new(
        pool.clone(),
        writer.clone(),
        events.clone(),
    ));
    let task_repository = Arc::new(TaskRepository::new(pool.clone(), writer.clone(), events));
    let tag_repository = Arc::new(TagRepository::new(pool.clone(), writer.clone()));

    let profile_service = Arc::new(ProfileService::new(profile_repository));
    let relationship_service = Arc::new(RelationshipService::new(relationship_repository.clone()));
    let task_service: Arc<dyn TaskServiceTrait> = Arc::new(TaskService::new(
        task_repository,
        relationship_repository,
    ));
    let tag_service = Arc::new(TagService::new(tag_repository, task_service.clone()));

    let sessions = Arc::new(SessionManager::new(&config.jwt_secret, config.token_ttl));

    Ok(Arc::new(AppState {
        profile_service,
        task_service,
        relationship_service,
        tag_service,
        change_hub,
        sessions,
    }))
}

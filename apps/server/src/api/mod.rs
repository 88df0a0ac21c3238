use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{auth, config::Config, main_lib::AppState, models};

mod boards;
mod friends;
mod profiles;
mod realtime;
mod tags;
mod tasks;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        auth::register,
        auth::sign_in,
        auth::sign_out,
        auth::me,
        tasks::list_tasks,
        tasks::create_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::move_task,
        tasks::list_task_tags,
        tasks::attach_tag,
        tasks::detach_tag,
        tags::list_tags,
        tags::create_tag,
        tags::delete_tag,
        friends::list_friends,
        friends::remove_friend,
        friends::list_requests,
        friends::send_request,
        friends::accept_request,
        friends::reject_request,
        boards::list_boards,
        boards::create_board,
        boards::list_board_tasks,
        profiles::search_profiles,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::SignInRequest,
        auth::Session,
        models::Profile,
        models::Task,
        models::NewTask,
        models::TaskUpdate,
        models::MoveTaskRequest,
        models::Tag,
        models::NewTag,
        models::TaskTag,
        models::FriendRequest,
        models::PendingRequest,
        models::SendFriendRequest,
        models::Friendship,
        models::AcceptedRequest,
        models::Friend,
        models::SharedBoard,
        models::NewSharedBoard,
    ))
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let layer = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{o}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        CorsLayer::new().allow_origin(origins)
    };
    Ok(layer.allow_methods(Any).allow_headers(Any))
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> anyhow::Result<Router> {
    let cors = cors_layer(config)?;

    let public = Router::new()
        .route("/healthz", get(healthz))
        .route("/openapi.json", get(openapi))
        .route("/auth/register", post(auth::register))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/signout", post(auth::sign_out));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .merge(tasks::router())
        .merge(tags::router())
        .merge(friends::router())
        .merge(boards::router())
        .merge(profiles::router())
        // Feeds are long-lived and so stay outside the request timeout.
        .layer(TimeoutLayer::new(config.request_timeout))
        .merge(realtime::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_jwt,
        ));

    let api = public.merge(protected);

    Ok(Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

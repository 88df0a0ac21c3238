use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Extension, Router,
};
use futures::Stream;
use serde::Serialize;
use tokio_stream::StreamExt;
use twodo_core::{
    realtime::{Change, ChangeFeed, ChangeOperation, FeedError, FeedStream, Record, SubscriptionScope},
    relationships::FriendRequest as CoreFriendRequest,
    tasks::Task as CoreTask,
};

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::ApiPath,
    main_lib::AppState,
    models::{FriendRequest, Task},
};

fn operation_name(op: ChangeOperation) -> &'static str {
    match op {
        ChangeOperation::Insert => "insert",
        ChangeOperation::Update => "update",
        ChangeOperation::Delete => "delete",
    }
}

/// Turns a scope's feed into SSE frames.
///
/// The first frame is `subscribed`. Each change is sent as seen from the
/// scope, so a row leaving it arrives as a `delete`. A lagged subscriber gets
/// a `resync` frame and should refetch its list.
fn change_events<T, D>(
    scope: SubscriptionScope,
    feed: FeedStream<T>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>>
where
    T: Record,
    D: From<T> + Serialize,
{
    let channel = scope.channel();
    let opened = tokio_stream::once(Ok::<_, Infallible>(
        SseEvent::default().event("subscribed").data(channel),
    ));

    let changes = feed.filter_map(move |item| match item {
        Ok(change) => {
            let change = change.localize(&scope)?;
            let name = operation_name(change.operation);
            let wire = Change::<D> {
                operation: change.operation,
                old: change.old.map(D::from),
                new: change.new.map(D::from),
            };
            match SseEvent::default().event(name).json_data(wire) {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    tracing::error!("Failed to serialize change for {}: {}", scope, err);
                    None
                }
            }
        }
        Err(FeedError::Lagged(missed)) => Some(Ok(SseEvent::default()
            .event("resync")
            .data(missed.to_string()))),
        Err(FeedError::Closed) => None,
    });

    Sse::new(opened.chain(changes)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn stream_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let scope = SubscriptionScope::personal(&user.user_id);
    let feed = ChangeFeed::<CoreTask>::subscribe(&state.change_hub, &scope).await?;
    Ok(change_events::<CoreTask, Task>(scope, feed))
}

async fn stream_board_tasks(
    ApiPath(id): ApiPath<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let board = state
        .relationship_service
        .ensure_board_member(&id, &user.user_id)?;
    let scope = SubscriptionScope::board(board.id);
    let feed = ChangeFeed::<CoreTask>::subscribe(&state.change_hub, &scope).await?;
    Ok(change_events::<CoreTask, Task>(scope, feed))
}

async fn stream_friend_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let scope = SubscriptionScope::incoming_requests(&user.user_id);
    let feed = ChangeFeed::<CoreFriendRequest>::subscribe(&state.change_hub, &scope).await?;
    Ok(change_events::<CoreFriendRequest, FriendRequest>(scope, feed))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/realtime/tasks", get(stream_tasks))
        .route("/realtime/boards/{id}", get(stream_board_tasks))
        .route("/realtime/friend-requests", get(stream_friend_requests))
}

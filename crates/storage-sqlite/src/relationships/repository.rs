use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use twodo_core::errors::Error;
use twodo_core::realtime::{Change, ChangeSink, RowChange};
use twodo_core::profiles::Profile;
use twodo_core::relationships::{
    AcceptedRequest, FriendRequest, FriendRequestStatus, FriendWithProfile, Friendship,
    PendingRequest, ProcedureCode, RelationshipRepositoryTrait, SharedBoard,
};
use twodo_core::Result;

use super::model::{BoardMemberDB, FriendRequestDB, FriendshipDB, SharedBoardDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::profiles::{find_by_username_tx, profile_exists_tx, ProfileDB};
use crate::schema::{board_members, friend_requests, friendships, profiles, shared_boards};
use crate::tasks::is_member_tx;

/// Request before and after a response, plus any friendship rows written.
type Responded = (FriendRequest, FriendRequest, Vec<Friendship>);

pub struct RelationshipRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    events: Arc<dyn ChangeSink>,
}

impl RelationshipRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, events: Arc<dyn ChangeSink>) -> Self {
        RelationshipRepository {
            pool,
            writer,
            events,
        }
    }

    /// Flips a pending request to `next`. Only the receiver may respond.
    async fn respond(
        &self,
        request_id: &str,
        user_id: &str,
        next: FriendRequestStatus,
    ) -> Result<Responded> {
        let request_id = request_id.to_string();
        let user_id = user_id.to_string();
        let responded = self
            .writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<Responded> {
                    let current = friend_requests::table
                        .find(&request_id)
                        .select(FriendRequestDB::as_select())
                        .first(conn)
                        .optional()
                        .map_err(StorageError::from)?
                        .ok_or_else(|| {
                            Error::procedure(ProcedureCode::NotFound, "Friend request not found")
                        })?;
                    if current.receiver_id != user_id {
                        return Err(Error::procedure(
                            ProcedureCode::Forbidden,
                            "Forbidden: only the receiver can respond",
                        ));
                    }
                    let old = FriendRequest::try_from(current)?;
                    if !old.status.can_transition_to(next) {
                        return Err(Error::procedure(
                            ProcedureCode::InvalidState,
                            "Request is not pending",
                        ));
                    }

                    let now = Utc::now().naive_utc();
                    let updated = diesel::update(friend_requests::table.find(&request_id))
                        .set((
                            friend_requests::status.eq(next.as_str()),
                            friend_requests::updated_at.eq(now),
                        ))
                        .returning(FriendRequestDB::as_returning())
                        .get_result(conn)
                        .map_err(StorageError::from)?;
                    let new = FriendRequest::try_from(updated)?;

                    let friendships = if next == FriendRequestStatus::Accepted {
                        befriend_tx(conn, &new.sender_id, &new.receiver_id, now)?
                    } else {
                        Vec::new()
                    };
                    Ok((old, new, friendships))
                },
            )
            .await?;

        let (old, new, _) = &responded;
        self.events.publish(RowChange::FriendRequests(Change::update(
            Some(old.clone()),
            new.clone(),
        )));
        Ok(responded)
    }
}

fn not_friends() -> Error {
    Error::procedure(ProcedureCode::NotFriends, "Users are not friends")
}

fn are_friends_tx(conn: &mut SqliteConnection, user_id: &str, friend_id: &str) -> Result<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        friendships::table
            .filter(friendships::user_id.eq(user_id))
            .filter(friendships::friend_id.eq(friend_id)),
    ))
    .get_result(conn)
    .map_err(StorageError::from)?)
}

/// Writes both directions of a friendship and returns them.
fn befriend_tx(
    conn: &mut SqliteConnection,
    a: &str,
    b: &str,
    now: NaiveDateTime,
) -> Result<Vec<Friendship>> {
    let rows = [
        FriendshipDB {
            user_id: a.to_string(),
            friend_id: b.to_string(),
            created_at: now,
        },
        FriendshipDB {
            user_id: b.to_string(),
            friend_id: a.to_string(),
            created_at: now,
        },
    ];
    diesel::insert_or_ignore_into(friendships::table)
        .values(&rows[..])
        .execute(conn)
        .map_err(StorageError::from)?;

    let stored = friendships::table
        .filter(
            friendships::user_id
                .eq(a)
                .and(friendships::friend_id.eq(b))
                .or(friendships::user_id.eq(b).and(friendships::friend_id.eq(a))),
        )
        .order(friendships::user_id.asc())
        .select(FriendshipDB::as_select())
        .load(conn)
        .map_err(StorageError::from)?;
    Ok(stored.into_iter().map(Friendship::from).collect())
}

#[async_trait]
impl RelationshipRepositoryTrait for RelationshipRepository {
    async fn send_friend_request(
        &self,
        sender_id: &str,
        receiver_username: &str,
    ) -> Result<FriendRequest> {
        let sender_id = sender_id.to_string();
        let receiver_username = receiver_username.to_string();
        let request = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FriendRequest> {
                let receiver = find_by_username_tx(conn, &receiver_username)?
                    .ok_or_else(|| Error::procedure(ProcedureCode::NotFound, "User not found"))?;
                if receiver.id == sender_id {
                    return Err(Error::procedure(
                        ProcedureCode::SelfReference,
                        "You cannot send a friend request to yourself",
                    ));
                }
                if are_friends_tx(conn, &sender_id, &receiver.id)? {
                    return Err(Error::procedure(
                        ProcedureCode::AlreadyExists,
                        "You are already friends",
                    ));
                }

                let pending_between: bool = diesel::select(diesel::dsl::exists(
                    friend_requests::table
                        .filter(friend_requests::status.eq(FriendRequestStatus::Pending.as_str()))
                        .filter(
                            friend_requests::sender_id
                                .eq(&sender_id)
                                .and(friend_requests::receiver_id.eq(&receiver.id))
                                .or(friend_requests::sender_id
                                    .eq(&receiver.id)
                                    .and(friend_requests::receiver_id.eq(&sender_id))),
                        ),
                ))
                .get_result(conn)
                .map_err(StorageError::from)?;
                if pending_between {
                    return Err(Error::procedure(
                        ProcedureCode::AlreadyExists,
                        "Friend request already exists",
                    ));
                }

                let now = Utc::now().naive_utc();
                let row = FriendRequestDB {
                    id: Uuid::new_v4().to_string(),
                    sender_id,
                    receiver_id: receiver.id,
                    status: FriendRequestStatus::Pending.as_str().to_string(),
                    created_at: now,
                    updated_at: now,
                };
                let inserted = diesel::insert_into(friend_requests::table)
                    .values(&row)
                    .returning(FriendRequestDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                FriendRequest::try_from(inserted)
            })
            .await?;

        self.events
            .publish(RowChange::FriendRequests(Change::insert(request.clone())));
        Ok(request)
    }

    async fn accept_friend_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<AcceptedRequest> {
        let (_, request, friendships) = self
            .respond(request_id, user_id, FriendRequestStatus::Accepted)
            .await?;
        Ok(AcceptedRequest {
            request,
            friendships,
        })
    }

    async fn reject_friend_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<FriendRequest> {
        let (_, request, _) = self
            .respond(request_id, user_id, FriendRequestStatus::Rejected)
            .await?;
        Ok(request)
    }

    async fn delete_friend(&self, user_id: &str, friend_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let friend_id = friend_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed = diesel::delete(
                    friendships::table.filter(
                        friendships::user_id
                            .eq(&user_id)
                            .and(friendships::friend_id.eq(&friend_id))
                            .or(friendships::user_id
                                .eq(&friend_id)
                                .and(friendships::friend_id.eq(&user_id))),
                    ),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                if removed == 0 {
                    return Err(Error::procedure(
                        ProcedureCode::NotFound,
                        "Friendship not found",
                    ));
                }
                Ok(removed)
            })
            .await
    }

    fn list_friends(&self, user_id: &str) -> Result<Vec<FriendWithProfile>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = friendships::table
            .inner_join(profiles::table.on(profiles::id.eq(friendships::friend_id)))
            .filter(friendships::user_id.eq(user_id))
            .order(profiles::username.asc())
            .select((FriendshipDB::as_select(), ProfileDB::as_select()))
            .load::<(FriendshipDB, ProfileDB)>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows
            .into_iter()
            .map(|(friendship, profile)| FriendWithProfile {
                friend_id: friendship.friend_id,
                since: friendship.created_at,
                profile: Profile::from(profile),
            })
            .collect())
    }

    fn list_pending_requests(&self, receiver_id: &str) -> Result<Vec<PendingRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = friend_requests::table
            .inner_join(profiles::table.on(profiles::id.eq(friend_requests::sender_id)))
            .filter(friend_requests::receiver_id.eq(receiver_id))
            .filter(friend_requests::status.eq(FriendRequestStatus::Pending.as_str()))
            .order(friend_requests::created_at.desc())
            .select((FriendRequestDB::as_select(), ProfileDB::as_select()))
            .load::<(FriendRequestDB, ProfileDB)>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|(request, sender)| {
                Ok(PendingRequest {
                    request: FriendRequest::try_from(request)?,
                    sender: Profile::from(sender),
                })
            })
            .collect()
    }

    async fn create_shared_board(
        &self,
        creator_id: &str,
        name: &str,
        friend_id: &str,
    ) -> Result<SharedBoard> {
        let creator_id = creator_id.to_string();
        let name = name.to_string();
        let friend_id = friend_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SharedBoard> {
                if !profile_exists_tx(conn, &friend_id)? {
                    return Err(Error::procedure(ProcedureCode::NotFound, "User not found"));
                }
                if !are_friends_tx(conn, &creator_id, &friend_id)? {
                    return Err(not_friends());
                }

                let now = Utc::now().naive_utc();
                let board = diesel::insert_into(shared_boards::table)
                    .values(&SharedBoardDB {
                        id: Uuid::new_v4().to_string(),
                        name,
                        created_by: creator_id.clone(),
                        created_at: now,
                    })
                    .returning(SharedBoardDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                let members = [creator_id, friend_id].map(|user_id| BoardMemberDB {
                    board_id: board.id.clone(),
                    user_id,
                    created_at: now,
                });
                diesel::insert_into(board_members::table)
                    .values(&members[..])
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!(
                    "Board {} shared between {} and {}",
                    board.id, members[0].user_id, members[1].user_id
                );

                Ok(SharedBoard::from(board))
            })
            .await
    }

    fn get_user_boards(&self, user_id: &str) -> Result<Vec<SharedBoard>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = shared_boards::table
            .inner_join(board_members::table)
            .filter(board_members::user_id.eq(user_id))
            .order(shared_boards::created_at.desc())
            .select(SharedBoardDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(SharedBoard::from).collect())
    }

    fn get_board(&self, board_id: &str) -> Result<Option<SharedBoard>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(shared_boards::table
            .find(board_id)
            .select(SharedBoardDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(SharedBoard::from))
    }

    fn is_board_member(&self, board_id: &str, user_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        is_member_tx(&mut conn, board_id, user_id)
    }
}

//! Database models for friend requests, friendships and shared boards.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use twodo_core::relationships::{FriendRequest, Friendship, SharedBoard};
use twodo_core::Error;

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::friend_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FriendRequestDB {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<FriendRequestDB> for FriendRequest {
    type Error = Error;

    fn try_from(db: FriendRequestDB) -> Result<Self, Self::Error> {
        Ok(FriendRequest {
            status: db.status.parse()?,
            id: db.id,
            sender_id: db.sender_id,
            receiver_id: db.receiver_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::friendships)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FriendshipDB {
    pub user_id: String,
    pub friend_id: String,
    pub created_at: NaiveDateTime,
}

impl From<FriendshipDB> for Friendship {
    fn from(db: FriendshipDB) -> Self {
        Friendship {
            user_id: db.user_id,
            friend_id: db.friend_id,
            created_at: db.created_at,
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::shared_boards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SharedBoardDB {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl From<SharedBoardDB> for SharedBoard {
    fn from(db: SharedBoardDB) -> Self {
        SharedBoard {
            id: db.id,
            name: db.name,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::board_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BoardMemberDB {
    pub board_id: String,
    pub user_id: String,
    pub created_at: NaiveDateTime,
}

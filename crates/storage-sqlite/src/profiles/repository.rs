use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use twodo_core::errors::{DatabaseError, Error};
use twodo_core::profiles::{Credentials, NewProfile, Profile, ProfileRepositoryTrait};
use twodo_core::Result;

use super::model::ProfileDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::profiles;

pub struct ProfileRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ProfileRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ProfileRepository { pool, writer }
    }

    fn find_db_by_username(&self, username: &str) -> Result<Option<ProfileDB>> {
        let mut conn = get_connection(&self.pool)?;
        // The column is NOCASE, so equality ignores case.
        Ok(profiles::table
            .filter(profiles::username.eq(username))
            .select(ProfileDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?)
    }
}

/// Looks a profile up by username inside a write job.
pub(crate) fn find_by_username_tx(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<ProfileDB>> {
    Ok(profiles::table
        .filter(profiles::username.eq(username))
        .select(ProfileDB::as_select())
        .first(conn)
        .optional()
        .map_err(StorageError::from)?)
}

pub(crate) fn profile_exists_tx(conn: &mut SqliteConnection, profile_id: &str) -> Result<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        profiles::table.filter(profiles::id.eq(profile_id)),
    ))
    .get_result(conn)
    .map_err(StorageError::from)?)
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn create_profile(
        &self,
        new_profile: NewProfile,
        password_hash: String,
    ) -> Result<Profile> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Profile> {
                let now = Utc::now().naive_utc();
                let row = ProfileDB {
                    id: Uuid::new_v4().to_string(),
                    username: new_profile.username,
                    full_name: new_profile.full_name,
                    avatar_url: new_profile.avatar_url,
                    password_hash,
                    created_at: now,
                    updated_at: now,
                };
                let inserted = diesel::insert_into(profiles::table)
                    .values(&row)
                    .returning(ProfileDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Profile::from(inserted))
            })
            .await
    }

    fn get_profile(&self, profile_id: &str) -> Result<Profile> {
        let mut conn = get_connection(&self.pool)?;
        profiles::table
            .find(profile_id)
            .select(ProfileDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Profile::from)
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Profile {} not found",
                    profile_id
                )))
            })
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Profile>> {
        Ok(self.find_db_by_username(username)?.map(Profile::from))
    }

    fn get_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        Ok(self.find_db_by_username(username)?.map(Credentials::from))
    }

    fn search_profiles(&self, query: &str, exclude_id: &str, limit: i64) -> Result<Vec<Profile>> {
        let mut conn = get_connection(&self.pool)?;
        let pattern = format!("%{}%", escape_like(query));
        let rows = profiles::table
            .filter(profiles::username.like(pattern).escape('\\'))
            .filter(profiles::id.ne(exclude_id))
            .order(profiles::username.asc())
            .limit(limit)
            .select(ProfileDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("a_b%"), "a\\_b\\%");
        assert_eq!(escape_like("bob"), "bob");
    }
}

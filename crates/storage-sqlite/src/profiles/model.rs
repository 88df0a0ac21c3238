//! Database models for profiles.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use twodo_core::profiles::{Credentials, Profile};

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProfileDB {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ProfileDB> for Profile {
    fn from(db: ProfileDB) -> Self {
        Profile {
            id: db.id,
            username: db.username,
            full_name: db.full_name,
            avatar_url: db.avatar_url,
            created_at: db.created_at,
        }
    }
}

impl From<ProfileDB> for Credentials {
    fn from(db: ProfileDB) -> Self {
        let password_hash = db.password_hash.clone();
        Credentials {
            profile: Profile::from(db),
            password_hash,
        }
    }
}

use async_trait::async_trait;

use super::profiles_model::{Credentials, NewProfile, Profile};
use crate::errors::Result;

/// Trait for profile repository operations
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    async fn create_profile(&self, new_profile: NewProfile, password_hash: String)
        -> Result<Profile>;
    fn get_profile(&self, profile_id: &str) -> Result<Profile>;
    fn find_by_username(&self, username: &str) -> Result<Option<Profile>>;
    fn get_credentials(&self, username: &str) -> Result<Option<Credentials>>;
    /// Case-insensitive substring match on username, excluding one profile.
    fn search_profiles(&self, query: &str, exclude_id: &str, limit: i64) -> Result<Vec<Profile>>;
}

/// Trait for profile service operations
#[async_trait]
pub trait ProfileServiceTrait: Send + Sync {
    async fn register(&self, new_profile: NewProfile, password_hash: String) -> Result<Profile>;
    fn get_profile(&self, profile_id: &str) -> Result<Profile>;
    fn credentials_for(&self, username: &str) -> Result<Option<Credentials>>;
    fn search(&self, user_id: &str, query: &str) -> Result<Vec<Profile>>;
}

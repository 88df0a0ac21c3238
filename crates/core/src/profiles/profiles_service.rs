use std::sync::Arc;

use log::{debug, info};

use super::profiles_model::{Credentials, NewProfile, Profile};
use super::profiles_traits::{ProfileRepositoryTrait, ProfileServiceTrait};
use crate::constants::PROFILE_SEARCH_LIMIT;
use crate::errors::{DatabaseError, Error, Result};

pub struct ProfileService {
    repository: Arc<dyn ProfileRepositoryTrait>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl ProfileServiceTrait for ProfileService {
    async fn register(&self, new_profile: NewProfile, password_hash: String) -> Result<Profile> {
        let new_profile = new_profile.normalize()?;
        if self
            .repository
            .find_by_username(&new_profile.username)?
            .is_some()
        {
            return Err(Error::Database(DatabaseError::UniqueViolation(format!(
                "Username '{}' already exists",
                new_profile.username
            ))));
        }
        let profile = self
            .repository
            .create_profile(new_profile, password_hash)
            .await?;
        info!("Registered profile {} ({})", profile.id, profile.username);
        Ok(profile)
    }

    fn get_profile(&self, profile_id: &str) -> Result<Profile> {
        self.repository.get_profile(profile_id)
    }

    fn credentials_for(&self, username: &str) -> Result<Option<Credentials>> {
        self.repository.get_credentials(username.trim())
    }

    /// Searches other users by username; a blank query returns nothing.
    fn search(&self, user_id: &str, query: &str) -> Result<Vec<Profile>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Searching profiles matching '{}'", query);
        self.repository
            .search_profiles(query, user_id, PROFILE_SEARCH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockProfileRepository {
        profiles: Mutex<Vec<Profile>>,
    }

    #[async_trait]
    impl ProfileRepositoryTrait for MockProfileRepository {
        async fn create_profile(
            &self,
            new_profile: NewProfile,
            _password_hash: String,
        ) -> Result<Profile> {
            let mut profiles = self.profiles.lock().unwrap();
            let profile = Profile {
                id: format!("user-{}", profiles.len() + 1),
                username: new_profile.username,
                full_name: new_profile.full_name,
                avatar_url: new_profile.avatar_url,
                created_at: Utc::now().naive_utc(),
            };
            profiles.push(profile.clone());
            Ok(profile)
        }

        fn get_profile(&self, profile_id: &str) -> Result<Profile> {
            self.profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == profile_id)
                .cloned()
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(profile_id.to_string())))
        }

        fn find_by_username(&self, username: &str) -> Result<Option<Profile>> {
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.username == username)
                .cloned())
        }

        fn get_credentials(&self, _username: &str) -> Result<Option<Credentials>> {
            unimplemented!()
        }

        fn search_profiles(
            &self,
            query: &str,
            exclude_id: &str,
            limit: i64,
        ) -> Result<Vec<Profile>> {
            let query = query.to_lowercase();
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.id != exclude_id && p.username.to_lowercase().contains(&query))
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    fn new_profile(username: &str) -> NewProfile {
        NewProfile {
            username: username.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_rejects_taken_username() {
        let service = ProfileService::new(Arc::new(MockProfileRepository::default()));
        service
            .register(new_profile("alice"), "hash".into())
            .await
            .unwrap();
        let err = service
            .register(new_profile(" alice "), "hash".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_search_excludes_self_and_ignores_blank_queries() {
        let service = ProfileService::new(Arc::new(MockProfileRepository::default()));
        let alice = service
            .register(new_profile("alice"), "hash".into())
            .await
            .unwrap();
        service
            .register(new_profile("alicia"), "hash".into())
            .await
            .unwrap();
        service
            .register(new_profile("bob"), "hash".into())
            .await
            .unwrap();

        let found = service.search(&alice.id, "ALI").unwrap();
        let names: Vec<_> = found.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["alicia"]);

        assert!(service.search(&alice.id, "   ").unwrap().is_empty());
    }
}

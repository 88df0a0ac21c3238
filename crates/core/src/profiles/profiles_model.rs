//! Profile domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{USERNAME_MAX_LEN, USERNAME_MIN_LEN};
use crate::{Error, Result};

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for registering a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProfile {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl NewProfile {
    /// Trims fields and checks the username shape.
    pub fn normalize(self) -> Result<NewProfile> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(Error::missing_field("username"));
        }
        let len = username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            return Err(Error::invalid_input(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(Error::invalid_input(
                "Username may only contain letters, digits, '.', '_' and '-'",
            ));
        }
        Ok(NewProfile {
            username,
            full_name: trimmed(self.full_name),
            avatar_url: trimmed(self.avatar_url),
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Stored login material. Never serialized.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub profile: Profile,
    pub password_hash: String,
}

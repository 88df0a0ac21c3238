//! Tag domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TAG_COLOR;
use crate::{Error, Result};

/// User-owned label that can be attached to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewTag {
    pub fn normalize(self) -> Result<NewTag> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::missing_field("name"));
        }
        let color = match self.color.map(|c| c.trim().to_string()) {
            Some(c) if c.is_empty() => DEFAULT_TAG_COLOR.to_string(),
            Some(c) if is_hex_color(&c) => c,
            Some(c) => {
                return Err(Error::invalid_input(format!(
                    "Color '{}' is not a #RRGGBB value",
                    c
                )))
            }
            None => DEFAULT_TAG_COLOR.to_string(),
        };
        Ok(NewTag {
            name,
            color: Some(color),
        })
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTag {
    pub task_id: String,
    pub tag_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_defaults_and_validation() {
        let tag = NewTag {
            name: " Work ".to_string(),
            color: None,
        }
        .normalize()
        .unwrap();
        assert_eq!(tag.name, "Work");
        assert_eq!(tag.color.as_deref(), Some(DEFAULT_TAG_COLOR));

        let tag = NewTag {
            name: "Home".to_string(),
            color: Some("#10b981".to_string()),
        }
        .normalize()
        .unwrap();
        assert_eq!(tag.color.as_deref(), Some("#10b981"));

        assert!(NewTag {
            name: "Bad".to_string(),
            color: Some("red".to_string()),
        }
        .normalize()
        .is_err());
    }
}

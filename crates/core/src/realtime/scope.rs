use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of rows one subscription follows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SubscriptionScope {
    /// Tasks on a user's personal list
    PersonalTasks { user_id: String },
    /// Tasks on one shared board
    BoardTasks { board_id: String },
    /// Pending friend requests addressed to a user
    IncomingFriendRequests { user_id: String },
}

impl SubscriptionScope {
    pub fn personal(user_id: impl Into<String>) -> Self {
        SubscriptionScope::PersonalTasks {
            user_id: user_id.into(),
        }
    }

    pub fn board(board_id: impl Into<String>) -> Self {
        SubscriptionScope::BoardTasks {
            board_id: board_id.into(),
        }
    }

    pub fn incoming_requests(user_id: impl Into<String>) -> Self {
        SubscriptionScope::IncomingFriendRequests {
            user_id: user_id.into(),
        }
    }

    /// Channel name, e.g. `tasks:{user_id}` or `board_tasks:{board_id}`.
    pub fn channel(&self) -> String {
        match self {
            SubscriptionScope::PersonalTasks { user_id } => format!("tasks:{}", user_id),
            SubscriptionScope::BoardTasks { board_id } => format!("board_tasks:{}", board_id),
            SubscriptionScope::IncomingFriendRequests { user_id } => {
                format!("friend_requests:{}", user_id)
            }
        }
    }
}

impl fmt::Display for SubscriptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.channel())
    }
}

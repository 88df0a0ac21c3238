//! Structured failures returned by the platform's named procedures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ErrorKind;

/// Failure class reported by a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureCode {
    NotFound,
    Forbidden,
    AlreadyExists,
    SelfReference,
    NotFriends,
    /// The target row is in a state that does not allow the transition.
    InvalidState,
    Unknown,
}

impl ProcedureCode {
    /// Infers the code from a message-only backend failure.
    pub fn from_message(message: &str) -> ProcedureCode {
        let message = message.to_lowercase();
        if message.contains("yourself") {
            ProcedureCode::SelfReference
        } else if message.contains("not friends") {
            ProcedureCode::NotFriends
        } else if message.contains("not found") {
            ProcedureCode::NotFound
        } else if message.contains("forbidden") {
            ProcedureCode::Forbidden
        } else if message.contains("exists") || message.contains("already") {
            ProcedureCode::AlreadyExists
        } else if message.contains("not pending") {
            ProcedureCode::InvalidState
        } else {
            ProcedureCode::Unknown
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcedureCode::NotFound => ErrorKind::NotFound,
            ProcedureCode::Forbidden | ProcedureCode::NotFriends => ErrorKind::Forbidden,
            ProcedureCode::AlreadyExists | ProcedureCode::InvalidState => ErrorKind::Conflict,
            ProcedureCode::SelfReference => ErrorKind::Validation,
            ProcedureCode::Unknown => ErrorKind::Unknown,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ProcedureError {
    pub code: ProcedureCode,
    pub message: String,
}

impl ProcedureError {
    pub fn new(code: ProcedureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds an error from a bare message, inferring the code.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code: ProcedureCode::from_message(&message),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_inference_from_backend_messages() {
        let cases = [
            ("User not found", ProcedureCode::NotFound),
            ("Forbidden: not a board member", ProcedureCode::Forbidden),
            ("Friend request already exists", ProcedureCode::AlreadyExists),
            ("You are already friends", ProcedureCode::AlreadyExists),
            (
                "You cannot send a friend request to yourself",
                ProcedureCode::SelfReference,
            ),
            ("Users are not friends", ProcedureCode::NotFriends),
            ("Request is not pending", ProcedureCode::InvalidState),
            ("disk I/O error", ProcedureCode::Unknown),
        ];
        for (message, expected) in cases {
            assert_eq!(ProcedureCode::from_message(message), expected, "{}", message);
        }
    }

    #[test]
    fn test_not_friends_maps_to_forbidden() {
        let err = ProcedureError::from_message("Users are not friends");
        assert_eq!(err.code.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "Users are not friends");
    }
}

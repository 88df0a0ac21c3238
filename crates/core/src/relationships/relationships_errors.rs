use thiserror::Error;

use super::procedure::{ProcedureCode, ProcedureError};
use crate::errors::{Error, ErrorKind};

/// Friend and board precondition failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationshipError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyFriends(String),

    #[error("{0}")]
    SelfReference(String),

    #[error("{0}")]
    Forbidden(String),
}

impl RelationshipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelationshipError::NotFound(_) => ErrorKind::NotFound,
            RelationshipError::AlreadyFriends(_) => ErrorKind::Conflict,
            RelationshipError::SelfReference(_) => ErrorKind::Validation,
            RelationshipError::Forbidden(_) => ErrorKind::Forbidden,
        }
    }

    /// Maps a procedure failure into the relationship vocabulary. Codes with
    /// no relationship meaning stay procedure errors.
    pub fn from_procedure(err: ProcedureError) -> Error {
        let ProcedureError { code, message } = err;
        match code {
            ProcedureCode::NotFound => RelationshipError::NotFound(message).into(),
            ProcedureCode::AlreadyExists => RelationshipError::AlreadyFriends(message).into(),
            ProcedureCode::SelfReference => RelationshipError::SelfReference(message).into(),
            ProcedureCode::Forbidden | ProcedureCode::NotFriends => {
                RelationshipError::Forbidden(message).into()
            }
            ProcedureCode::InvalidState | ProcedureCode::Unknown => {
                Error::Procedure(ProcedureError { code, message })
            }
        }
    }
}

/// Applied once to every error leaving a relationship operation.
pub(crate) fn gate(err: Error) -> Error {
    match err {
        Error::Procedure(p) => RelationshipError::from_procedure(p),
        other => other,
    }
}

//! The module contains the errors the engine can throw.
//!
//! Every [`EngineError`] maps to a stable [`ErrorCode`], and every code maps
//! to an [`ErrorCategory`] plus a human readable detail string. Callers that
//! render errors (a CLI, an HTTP layer) should match on the code instead of
//! on the `Display` output.
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid username \"{0}\"")]
    InvalidUsername(String),
    #[error("name must not be blank")]
    BlankName,
    #[error("\"{0}\" already taken!")]
    UsernameTaken(String),
    #[error("invalid {0} id")]
    InvalidId(String),
    #[error("user \"{0}\" not found!")]
    UserNotFound(String),
    #[error("message \"{0}\" not found!")]
    MessageNotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("sender \"{0}\" not found!")]
    SenderNotFound(String),
    #[error("recipient \"{0}\" not found!")]
    RecipientNotFound(String),
    #[error("\"{0}\" has no budget left")]
    BudgetExceeded(String),
    #[error("budget discrepancy for \"{username}\": expected {expected}, got {actual}")]
    BudgetDiscrepancy {
        username: String,
        expected: i64,
        actual: i64,
    },
    #[error("debit task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUsername(_) => ErrorCode::InvalidUsername,
            Self::BlankName => ErrorCode::BlankName,
            Self::UsernameTaken(_) => ErrorCode::UsernameTaken,
            Self::InvalidId(_) => ErrorCode::InvalidId,
            Self::UserNotFound(_) => ErrorCode::UserNotFound,
            Self::MessageNotFound(_) => ErrorCode::MessageNotFound,
            Self::BadRequest(_) => ErrorCode::BadRequest,
            Self::SenderNotFound(_) => ErrorCode::SenderNotFound,
            Self::RecipientNotFound(_) => ErrorCode::RecipientNotFound,
            Self::BudgetExceeded(_) => ErrorCode::BudgetExceeded,
            Self::BudgetDiscrepancy { .. } => ErrorCode::BudgetDiscrepancy,
            Self::Task(_) | Self::Database(_) => ErrorCode::Internal,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidUsername(a), Self::InvalidUsername(b)) => a == b,
            (Self::BlankName, Self::BlankName) => true,
            (Self::UsernameTaken(a), Self::UsernameTaken(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::UserNotFound(a), Self::UserNotFound(b)) => a == b,
            (Self::MessageNotFound(a), Self::MessageNotFound(b)) => a == b,
            (Self::BadRequest(a), Self::BadRequest(b)) => a == b,
            (Self::SenderNotFound(a), Self::SenderNotFound(b)) => a == b,
            (Self::RecipientNotFound(a), Self::RecipientNotFound(b)) => a == b,
            (Self::BudgetExceeded(a), Self::BudgetExceeded(b)) => a == b,
            (
                Self::BudgetDiscrepancy {
                    username: a,
                    expected: ea,
                    actual: aa,
                },
                Self::BudgetDiscrepancy {
                    username: b,
                    expected: eb,
                    actual: ab,
                },
            ) => a == b && ea == eb && aa == ab,
            (Self::Task(a), Self::Task(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Coarse error class, one per kind of caller reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or missing input. Never touches the store.
    BadRequest,
    /// Uniqueness violation.
    Conflict,
    /// Referenced entity absent.
    NotFound,
    /// Budget exhausted.
    Forbidden,
    /// Store or unexpected failure.
    Internal,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Internal => "internal",
        }
    }
}

/// Fine grained, enumerable error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidUsername,
    BlankName,
    UsernameTaken,
    InvalidId,
    UserNotFound,
    MessageNotFound,
    BadRequest,
    SenderNotFound,
    RecipientNotFound,
    BudgetExceeded,
    BudgetDiscrepancy,
    Internal,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 12] = [
        Self::InvalidUsername,
        Self::BlankName,
        Self::UsernameTaken,
        Self::InvalidId,
        Self::UserNotFound,
        Self::MessageNotFound,
        Self::BadRequest,
        Self::SenderNotFound,
        Self::RecipientNotFound,
        Self::BudgetExceeded,
        Self::BudgetDiscrepancy,
        Self::Internal,
    ];

    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::InvalidUsername | Self::BlankName | Self::InvalidId | Self::BadRequest => {
                ErrorCategory::BadRequest
            }
            Self::UsernameTaken => ErrorCategory::Conflict,
            Self::UserNotFound
            | Self::MessageNotFound
            | Self::SenderNotFound
            | Self::RecipientNotFound => ErrorCategory::NotFound,
            Self::BudgetExceeded => ErrorCategory::Forbidden,
            Self::BudgetDiscrepancy | Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Human readable detail for the code.
    pub const fn detail(self) -> &'static str {
        match self {
            Self::InvalidUsername => {
                "The username must start with a lowercase letter and contain only lowercase letters, digits, dots, dashes and underscores."
            }
            Self::BlankName => "The name value cannot be blank.",
            Self::UsernameTaken => "This username has already been taken by another user.",
            Self::InvalidId => "The supplied object ID is invalid.",
            Self::UserNotFound => "Username not found.",
            Self::MessageNotFound => "Message not found.",
            Self::BadRequest => "The message is malformed.",
            Self::SenderNotFound => "Sender username not found.",
            Self::RecipientNotFound => "Recipient username not found.",
            Self::BudgetExceeded => "The sender username has no budget left.",
            Self::BudgetDiscrepancy => "The sender budget changed while the message was sent.",
            Self::Internal => "Unexpected internal error.",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUsername => "invalid_username",
            Self::BlankName => "blank_name",
            Self::UsernameTaken => "username_taken",
            Self::InvalidId => "invalid_id",
            Self::UserNotFound => "user_not_found",
            Self::MessageNotFound => "message_not_found",
            Self::BadRequest => "bad_request",
            Self::SenderNotFound => "sender_not_found",
            Self::RecipientNotFound => "recipient_not_found",
            Self::BudgetExceeded => "budget_exceeded",
            Self::BudgetDiscrepancy => "budget_discrepancy",
            Self::Internal => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_internal() {
        let err = EngineError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(err.code(), ErrorCode::Internal);
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn username_taken_is_conflict() {
        let err = EngineError::UsernameTaken("orange".to_string());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn budget_exceeded_is_forbidden() {
        let err = EngineError::BudgetExceeded("orange".to_string());
        assert_eq!(err.category(), ErrorCategory::Forbidden);
    }

    #[test]
    fn exchange_lookups_are_not_found() {
        assert_eq!(
            EngineError::SenderNotFound("ghost".to_string()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            EngineError::RecipientNotFound("ghost".to_string()).category(),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn every_code_has_a_detail_and_a_distinct_name() {
        let mut names = std::collections::HashSet::new();
        for code in ErrorCode::ALL {
            assert!(!code.detail().is_empty());
            assert!(names.insert(code.as_str()));
        }
    }
}

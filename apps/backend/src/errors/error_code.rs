//! Error codes for the quiz backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes. Every code
//! is SCREAMING_SNAKE_CASE and maps 1:1 to the string in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication
    /// Admin credentials missing or wrong
    Unauthorized,

    // Request validation
    /// General bad request error
    BadRequest,
    /// Request body could not be parsed as JSON
    InvalidJson,
    /// Content-Type not accepted by the endpoint
    UnsupportedContentType,
    /// General validation error
    ValidationError,
    /// Question id missing or not a positive integer
    InvalidQuestionId,
    /// Unknown round status
    InvalidStatus,
    /// Required field absent
    MissingField,

    // Resource not found
    /// Question not found
    QuestionNotFound,
    /// Choice not found
    ChoiceNotFound,
    /// User not found
    UserNotFound,
    /// Bingo card not found
    CardNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Unique constraint violated
    UniqueViolation,
    /// General conflict
    Conflict,

    // System
    /// Database error
    DbError,
    /// Database not configured or unreachable
    DbUnavailable,
    /// Stored data could not be decoded
    DataCorruption,
    /// Configuration error
    ConfigError,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidJson => "INVALID_JSON",
            Self::UnsupportedContentType => "UNSUPPORTED_CONTENT_TYPE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidQuestionId => "INVALID_QUESTION_ID",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::MissingField => "MISSING_FIELD",
            Self::QuestionNotFound => "QUESTION_NOT_FOUND",
            Self::ChoiceNotFound => "CHOICE_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CardNotFound => "CARD_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::Conflict => "CONFLICT",
            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::Unauthorized,
        ErrorCode::BadRequest,
        ErrorCode::InvalidJson,
        ErrorCode::UnsupportedContentType,
        ErrorCode::ValidationError,
        ErrorCode::InvalidQuestionId,
        ErrorCode::InvalidStatus,
        ErrorCode::MissingField,
        ErrorCode::QuestionNotFound,
        ErrorCode::ChoiceNotFound,
        ErrorCode::UserNotFound,
        ErrorCode::CardNotFound,
        ErrorCode::NotFound,
        ErrorCode::UniqueViolation,
        ErrorCode::Conflict,
        ErrorCode::DbError,
        ErrorCode::DbUnavailable,
        ErrorCode::DataCorruption,
        ErrorCode::ConfigError,
        ErrorCode::InternalError,
    ];

    #[test]
    fn codes_are_unique_screaming_snake_case() {
        let mut seen = HashSet::new();
        for code in ALL {
            let s = code.as_str();
            assert!(seen.insert(s), "duplicate error code {s}");
            assert!(s
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(ErrorCode::DbUnavailable.to_string(), "DB_UNAVAILABLE");
    }
}

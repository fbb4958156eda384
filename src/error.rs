#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const E_NOT_FOUND: &str = "E-NOT-FOUND";
pub const E_DUPLICATE: &str = "E-DUPLICATE";
pub const E_PARSE: &str = "E-PARSE";
pub const E_VALIDATION: &str = "E-VALIDATION";
pub const E_UNSUPPORTED_TYPE: &str = "E-UNSUPPORTED-TYPE";
pub const E_CONFLICT: &str = "E-CONFLICT";
pub const E_IO: &str = "E-IO";
pub const E_JSON: &str = "E-JSON";

// ═══════════════════════════════════════════════════════════════════════════════
// API ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Every failure surfaced by the reader, the edit engine and the service.
///
/// A batch aborts on the first error, so any of these leaves the file on disk
/// untouched.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("invalid {0}")]
    Validation(String),

    #[error("type `{0}` is not allowed, use the nasl.core / nasl.collection equivalent")]
    UnsupportedType(String),

    #[error("{path} changed on disk (expected {expected}, found {actual})")]
    Conflict {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => E_NOT_FOUND,
            ApiError::Duplicate(_) => E_DUPLICATE,
            ApiError::Parse { .. } => E_PARSE,
            ApiError::Validation(_) => E_VALIDATION,
            ApiError::UnsupportedType(_) => E_UNSUPPORTED_TYPE,
            ApiError::Conflict { .. } => E_CONFLICT,
            ApiError::Io(_) => E_IO,
            ApiError::Json(_) => E_JSON,
        }
    }

    /// Parse-class failures, including disallowed type references.
    pub fn is_parse(&self) -> bool {
        matches!(self, ApiError::Parse { .. } | ApiError::UnsupportedType(_))
    }
}

/// Flattened error handed to foreign callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
}

impl From<&ApiError> for ErrorReport {
    fn from(err: &ApiError) -> Self {
        ErrorReport {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_messages() {
        let err = ApiError::NotFound("prop `value` in class `FooOptions`".to_string());
        assert_eq!(err.code(), E_NOT_FOUND);
        assert_eq!(err.to_string(), "prop `value` in class `FooOptions` not found");

        let report = ErrorReport::from(&ApiError::parse("api.ts", "Unexpected token"));
        assert_eq!(report.code, "E-PARSE");
        assert_eq!(report.message, "failed to parse api.ts: Unexpected token");
    }

    #[test]
    fn test_unsupported_type_is_parse_class() {
        assert!(ApiError::UnsupportedType("String".into()).is_parse());
        assert!(!ApiError::Validation("name".into()).is_parse());
    }
}

//! Usage: Unified error model (maps every failure to a `CODE: message` string).

use std::sync::Arc;

pub type AppResult<T> = Result<T, AppError>;

/// Stable error classification shared by every layer of the freeze workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing or invalid client/service configuration.
    Config,
    /// Grant exchange against a token endpoint failed.
    Auth,
    /// Startup probe of a registered service failed.
    Connection,
    /// Network-level failure on an authenticated request.
    Transport,
    /// Listing response could not be used.
    Fetch,
    /// A client name was never registered.
    Lookup,
    /// Operator input was rejected.
    Validation,
    /// The freeze endpoint refused the bulk request.
    Submission,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "CONFIG_ERROR",
            Self::Auth => "AUTH_ERROR",
            Self::Connection => "CONNECTION_ERROR",
            Self::Transport => "TRANSPORT_ERROR",
            Self::Fetch => "FETCH_ERROR",
            Self::Lookup => "LOOKUP_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Submission => "SUBMISSION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AppError {
    code: ErrorCode,
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn code(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_is_code_colon_message() {
        let err = AppError::with_code(
            ErrorCode::Auth,
            "service=42-v2 token endpoint returned status=401",
        );
        assert!(err.is(ErrorCode::Auth));
        assert!(!err.is(ErrorCode::Connection));
        assert_eq!(err.code(), "AUTH_ERROR");
        assert_eq!(
            err.to_string(),
            "AUTH_ERROR: service=42-v2 token endpoint returned status=401"
        );
    }

    #[test]
    fn source_is_exposed_but_not_displayed() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timed out");
        let err = AppError::with_code(ErrorCode::Transport, "GET /cursus failed").with_source(io);
        assert_eq!(err.to_string(), "TRANSPORT_ERROR: GET /cursus failed");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("socket timed out")
        );
    }

    #[test]
    fn every_code_has_a_distinct_suffixed_name() {
        let codes = [
            ErrorCode::Config,
            ErrorCode::Auth,
            ErrorCode::Connection,
            ErrorCode::Transport,
            ErrorCode::Fetch,
            ErrorCode::Lookup,
            ErrorCode::Validation,
            ErrorCode::Submission,
            ErrorCode::Internal,
        ];
        let names: std::collections::HashSet<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), codes.len());
        assert!(names.iter().all(|n| n.ends_with("_ERROR")));
    }
}

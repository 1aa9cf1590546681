//! Tool-specific error types.

use thiserror::Error;

use super::validation::ValidationError;
use crate::client::ClientError;

/// Result type returned by tool handlers.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool operations.
///
/// The display text is what the client sees in the error result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Arguments were rejected before contacting Redmine.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Redmine rejected the request or could not be reached.
    #[error(transparent)]
    Remote(#[from] ClientError),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_client_facing() {
        assert_eq!(
            ToolError::not_found("redmine_nope").to_string(),
            "Unknown tool: redmine_nope"
        );
        assert_eq!(
            ToolError::from(ValidationError::field("id", "is required")).to_string(),
            "Validation error: id: is required"
        );
        assert_eq!(
            ToolError::internal("boom").to_string(),
            "Internal error: boom"
        );
    }
}

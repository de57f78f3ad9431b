//! Error types for the conversation engine.

use concierge_core::error::ConciergeError;

/// Errors from the conversation engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("business not found: {0}")]
    BusinessNotFound(String),
    #[error("generator error: {0}")]
    Upstream(String),
    #[error("storage error: {0}")]
    StorageError(String),
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl ChatError {
    /// Whether the caller sent something unusable, as opposed to an
    /// internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) | ChatError::BusinessNotFound(_)
        )
    }
}

impl From<ConciergeError> for ChatError {
    fn from(err: ConciergeError) -> Self {
        ChatError::Catalog(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Upstream(format!("request timed out: {}", err))
        } else {
            ChatError::Upstream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::Disabled.to_string(), "chat is disabled");
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(1000).to_string(),
            "message exceeds maximum length of 1000 characters"
        );
        assert_eq!(
            ChatError::BusinessNotFound("acme".to_string()).to_string(),
            "business not found: acme"
        );
        assert_eq!(
            ChatError::Upstream("HTTP 503".to_string()).to_string(),
            "generator error: HTTP 503"
        );
        assert_eq!(
            ChatError::StorageError("disk full".to_string()).to_string(),
            "storage error: disk full"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(ChatError::EmptyMessage.is_client_error());
        assert!(ChatError::MessageTooLong(10).is_client_error());
        assert!(ChatError::BusinessNotFound("x".into()).is_client_error());
        assert!(!ChatError::Upstream("x".into()).is_client_error());
        assert!(!ChatError::StorageError("x".into()).is_client_error());
        assert!(!ChatError::Disabled.is_client_error());
    }

    #[test]
    fn test_chat_error_from_concierge_error() {
        let err: ChatError = ConciergeError::Config("duplicate id".to_string()).into();
        assert!(matches!(err, ChatError::Catalog(_)));
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn test_message_too_long_boundary_zero() {
        assert_eq!(
            ChatError::MessageTooLong(0).to_string(),
            "message exceeds maximum length of 0 characters"
        );
    }

    #[test]
    fn test_errors_implement_debug() {
        let dbg = format!("{:?}", ChatError::BusinessNotFound("acme".into()));
        assert!(dbg.contains("BusinessNotFound"));
    }
}

use thiserror::Error;

/// Core error types for usher domain operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),
}

impl CoreError {
    /// Create a new InvalidTimestamp error
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp(message.into())
    }

    /// Check if this error stems from bad input rather than a system fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidTimestamp(_) | Self::JsonError(_))
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timestamp_error() {
        let err = CoreError::invalid_timestamp("not-a-date");
        assert_eq!(err.to_string(), "Invalid timestamp: not-a-date");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let core_err: CoreError = json_err.into();

        assert!(matches!(core_err, CoreError::JsonError(_)));
        assert!(core_err.is_client_error());
    }

    #[test]
    fn test_uuid_error_conversion() {
        let uuid_err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let core_err: CoreError = uuid_err.into();

        assert!(matches!(core_err, CoreError::UuidError(_)));
        assert!(!core_err.is_client_error());
    }

    #[test]
    fn test_result_type_usage() {
        fn ok_case() -> Result<String> {
            Ok("success".to_string())
        }

        fn err_case() -> Result<String> {
            Err(CoreError::invalid_timestamp("bad"))
        }

        assert!(ok_case().is_ok());
        assert!(err_case().is_err());
    }
}

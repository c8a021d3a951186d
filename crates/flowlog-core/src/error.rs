//! Error types for flowlog

use thiserror::Error;

/// Result type alias for flowlog operations
pub type Result<T, E = LogError> = std::result::Result<T, E>;

/// Errors raised while assembling a log record or loading configuration.
///
/// None of these ever escape the infallible entry points on
/// [`FlowLogger`](crate::FlowLogger); they are only returned from the
/// `try_*` variants and from configuration loading.
#[derive(Debug, Error)]
pub enum LogError {
    /// Event or health content was not valid JSON.
    #[error("Invalid JSON content: {0}")]
    InvalidContent(#[from] serde_json::Error),

    /// Event or health content parsed, but is not a JSON object.
    #[error("JSON content must be an object, got {0}")]
    ContentNotObject(&'static str),

    /// A context field was given a value of the wrong shape.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField {
        /// Reserved field name
        field: String,
        /// What was wrong with the value
        reason: String,
    },

    /// Environment-based configuration could not be deserialized.
    #[cfg(feature = "config")]
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
}

impl LogError {
    /// Create an invalid-field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to read a message body as text.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body bytes are not valid UTF-8.
    #[error("{0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The body is a stream that was already consumed or could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The host could not provide a body at all.
    #[error("{0}")]
    Unavailable(String),
}

impl PayloadError {
    /// Short name of the failure, embedded in payload diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadError::Utf8(_) => "Utf8Error",
            PayloadError::Io(_) => "IoError",
            PayloadError::Unavailable(_) => "Unavailable",
        }
    }

    /// Diagnostic text logged in place of an unreadable payload.
    pub fn diagnostic(&self) -> String {
        format!("Unable to get payload: {} {}", self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_diagnostic_embeds_kind_and_message() {
        let err = PayloadError::Unavailable("stream closed".to_string());
        assert_eq!(err.diagnostic(), "Unable to get payload: Unavailable stream closed");
    }

    #[test]
    fn test_utf8_payload_error_kind() {
        let err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err = PayloadError::from(err);
        assert_eq!(err.kind(), "Utf8Error");
        assert!(err.diagnostic().starts_with("Unable to get payload: Utf8Error "));
    }

    #[test]
    fn test_invalid_content_from_serde() {
        let err: LogError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, LogError::InvalidContent(_)));
        assert!(err.to_string().starts_with("Invalid JSON content"));
    }
}

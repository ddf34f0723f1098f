/// Error types for host calls

use thiserror::Error;

/// Result type alias for anything that talks to the browser
pub type HostResult<T> = Result<T, HostError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The host promise was rejected (tab closed mid-operation, group gone, ...)
    #[error("Host rejected call: {0}")]
    Rejected(String),

    #[error("Failed to decode host value: {0}")]
    Decode(String),

    #[error("Failed to encode value for host: {0}")]
    Encode(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl HostError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<serde_json::Error> for HostError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HostError::rejected("No tab with id: 4");
        assert_eq!(err.to_string(), "Host rejected call: No tab with id: 4");
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<Vec<i32>, _> = serde_json::from_str("{not json");
        let err: HostError = parse.unwrap_err().into();
        assert!(matches!(err, HostError::Decode(_)));
    }
}

// src/error.rs
use std::time::Duration;

/// Network leg a failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    WatchPage,
    Transcript,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::WatchPage => write!(f, "watch page"),
            Stage::Transcript => write!(f, "transcript request"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Invalid video identifier: {0}")]
    InvalidVideoIdentifier(String),

    #[error("Network error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Network {
        status: Option<u16>,
        message: String,
    },

    #[error("Timed out after {}s waiting for {stage}", .after.as_secs())]
    Timeout { stage: Stage, after: Duration },

    #[error("{message}")]
    Upstream { code: Option<i64>, message: String },

    #[error("No transcript available for this video")]
    NoTranscriptAvailable,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    #[error("Monthly usage limit reached")]
    QuotaExceeded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Usage ledger error: {0}")]
    Usage(String),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl TranscriptError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        TranscriptError::Network {
            status,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            TranscriptError::InvalidVideoIdentifier(_) => "invalid_video_id",
            TranscriptError::Network { .. } => "network_error",
            TranscriptError::Timeout { .. } => "timeout",
            TranscriptError::Upstream { .. } => "upstream_error",
            TranscriptError::NoTranscriptAvailable => "no_transcript",
            TranscriptError::MalformedResponse(_) => "malformed_response",
            TranscriptError::Unauthenticated => "auth_failed",
            TranscriptError::RateLimited => "rate_limited",
            TranscriptError::QuotaExceeded => "quota_exceeded",
            TranscriptError::Config(_) => "config_error",
            TranscriptError::Usage(_) => "internal_error",
            TranscriptError::SerdeJson(_) => "internal_error",
        }
    }

    /// Status code the request handler answers with for this failure.
    pub fn http_status(&self) -> u16 {
        match self {
            TranscriptError::InvalidVideoIdentifier(_) => 400,
            TranscriptError::Unauthenticated => 401,
            TranscriptError::QuotaExceeded => 403,
            TranscriptError::RateLimited => 429,
            _ => 500,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TranscriptError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            TranscriptError::InvalidVideoIdentifier("x".into()).http_status(),
            400
        );
        assert_eq!(TranscriptError::Unauthenticated.http_status(), 401);
        assert_eq!(TranscriptError::QuotaExceeded.http_status(), 403);
        assert_eq!(TranscriptError::RateLimited.http_status(), 429);
        assert_eq!(TranscriptError::NoTranscriptAvailable.http_status(), 500);
        assert_eq!(TranscriptError::network(Some(503), "down").http_status(), 500);
    }

    #[test]
    fn test_upstream_message_is_verbatim() {
        let err = TranscriptError::Upstream {
            code: Some(400),
            message: "Precondition check failed.".to_string(),
        };
        assert_eq!(err.to_string(), "Precondition check failed.");
    }

    #[test]
    fn test_network_display_includes_status() {
        let err = TranscriptError::network(Some(404), "Not Found");
        assert_eq!(err.to_string(), "Network error (HTTP 404): Not Found");
        let err = TranscriptError::network(None, "connection refused");
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_timeout_display() {
        let err = TranscriptError::Timeout {
            stage: Stage::Transcript,
            after: Duration::from_secs(30),
        };
        assert!(err.is_timeout());
        assert_eq!(err.code_str(), "timeout");
        assert_eq!(
            err.to_string(),
            "Timed out after 30s waiting for transcript request"
        );
    }
}

//! Errors returned by the remote accessor.

use serde_json::Value;

/// Failure of a single API call. Never fatal: callers retry or change parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, aborted).
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status. `body` is the parsed JSON
    /// error body, or `None` when it was empty or not JSON.
    #[error("API error ({status})")]
    Http { status: u16, body: Option<Value> },
    /// Still unauthorized after a session refresh attempt.
    #[error("authentication failed")]
    Auth,
    /// A 2xx response whose body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn http(status: u16, body: Option<Value>) -> Self {
        Self::Http { status, body }
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Auth => Some(401),
            _ => None,
        }
    }

    /// A 404 on an inventory resource means "not provisioned yet", not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http { status: 404, .. })
    }

    /// Best-effort human message: `detail` or `message` from the error body.
    pub fn message(&self) -> String {
        if let ApiError::Http { body: Some(body), .. } = self {
            for key in ["detail", "message", "error"] {
                if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
                    return text.to_string();
                }
            }
        }
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_http_404_counts_as_not_found() {
        assert!(ApiError::http(404, None).is_not_found());
        assert!(!ApiError::http(500, None).is_not_found());
        assert!(!ApiError::Network("refused".into()).is_not_found());
    }

    #[test]
    fn message_prefers_body_detail() {
        let err = ApiError::http(422, Some(json!({ "detail": "size too large" })));
        assert_eq!(err.message(), "size too large");
        assert_eq!(ApiError::http(500, None).message(), "API error (500)");
    }

    #[test]
    fn auth_reports_401() {
        assert_eq!(ApiError::Auth.status(), Some(401));
        assert_eq!(ApiError::Decode("x".into()).status(), None);
    }
}

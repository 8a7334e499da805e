use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Normalized failure returned by every fallible client operation.
///
/// Classification happens in one place (here); callers render the message
/// verbatim and never re-interpret it. The variant only matters to callers
/// deciding whether a retry affordance makes sense, via [`is_retryable`].
///
/// [`is_retryable`]: ApiError::is_retryable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend received the request and rejected it (authentication
    /// or validation failure). User-correctable.
    #[error("{0}")]
    ServerRejected(String),

    /// No response arrived at all - connection refused or timed out.
    #[error("{0}")]
    Unreachable(String),

    /// The failure happened before a request was sent, or the response
    /// body had an unexpected shape.
    #[error("{0}")]
    MalformedResponse(String),

    /// Misuse of the client API by calling code, e.g. updating the profile
    /// without an authenticated session.
    #[error("{0}")]
    ClientError(String),
}

/// Maximum length for response bodies folded into error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid flooding logs or UI surfaces
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Connectivity failure with guidance naming the configured backend.
    pub fn unreachable(base_url: &str) -> Self {
        ApiError::Unreachable(format!(
            "Cannot connect to server. Please check if the backend is running at {}",
            base_url
        ))
    }

    /// Classify a non-success HTTP response.
    ///
    /// Priority order, first match wins:
    /// 1. JSON body with a string `detail` or `message` field - that value
    ///    verbatim (how the backend reports auth/validation failures)
    /// 2. plain string body (JSON string literal or non-JSON text)
    /// 3. synthesized `<code> <status text>` line when no usable message
    ///    was carried
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let body = body.trim();

        match serde_json::from_str::<Value>(body) {
            Ok(value) => {
                if let Some(detail) = value.get("detail").and_then(Value::as_str) {
                    return ApiError::ServerRejected(detail.to_string());
                }
                if let Some(message) = value.get("message").and_then(Value::as_str) {
                    return ApiError::ServerRejected(message.to_string());
                }
                if let Some(text) = value.as_str() {
                    if !text.is_empty() {
                        return ApiError::ServerRejected(Self::truncate_body(text));
                    }
                }
            }
            Err(_) => {
                if !body.is_empty() {
                    return ApiError::ServerRejected(Self::truncate_body(body));
                }
            }
        }

        ApiError::ServerRejected(format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        ))
    }

    /// Whether retrying could plausibly succeed. Only connectivity
    /// failures qualify; rejected requests will be rejected again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_field_used_verbatim() {
        let err = ApiError::from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Invalid credentials"}"#,
        );
        assert_eq!(err, ApiError::ServerRejected("Invalid credentials".to_string()));
    }

    #[test]
    fn test_message_field_fallback() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Email already registered"}"#,
        );
        assert_eq!(
            err,
            ApiError::ServerRejected("Email already registered".to_string())
        );
    }

    #[test]
    fn test_detail_beats_status_synthesis() {
        // Rule 1 must win even for statuses that would synthesize a message
        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Inactive user account"}"#,
        );
        assert_eq!(
            err,
            ApiError::ServerRejected("Inactive user account".to_string())
        );
    }

    #[test]
    fn test_json_string_body() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, r#""bad request body""#);
        assert_eq!(err, ApiError::ServerRejected("bad request body".to_string()));
    }

    #[test]
    fn test_plain_text_body() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream offline");
        assert_eq!(err, ApiError::ServerRejected("upstream offline".to_string()));
    }

    #[test]
    fn test_empty_body_synthesizes_status_line() {
        let err = ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(
            err,
            ApiError::ServerRejected("503 Service Unavailable".to_string())
        );
    }

    #[test]
    fn test_object_without_known_fields_synthesizes_status_line() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, r#"{"code": 42}"#);
        assert_eq!(err, ApiError::ServerRejected("400 Bad Request".to_string()));
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, &body);
        match err {
            ApiError::ServerRejected(message) => {
                assert!(message.contains("truncated"));
                assert!(message.contains("2000 total bytes"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_guidance_names_backend() {
        let err = ApiError::unreachable("http://localhost:8000");
        assert!(err.to_string().contains("http://localhost:8000"));
        assert!(err.to_string().contains("Cannot connect to server"));
    }

    #[test]
    fn test_only_unreachable_is_retryable() {
        assert!(ApiError::unreachable("http://localhost:8000").is_retryable());
        assert!(!ApiError::ServerRejected("no".to_string()).is_retryable());
        assert!(!ApiError::MalformedResponse("bad".to_string()).is_retryable());
        assert!(!ApiError::ClientError("misuse".to_string()).is_retryable());
    }
}

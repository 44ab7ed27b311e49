//! HTTP failure classification shared by every outbound adapter

use reqwest::StatusCode;
use review_domain::{CallError, ErrorCategory};

const MAX_BODY_CHARS: usize = 240;

/// Map an HTTP status onto the closed error taxonomy
pub fn classify_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        401 | 403 => ErrorCategory::Authentication,
        408 => ErrorCategory::Timeout,
        429 => ErrorCategory::RateLimit,
        400 | 404 | 422 => ErrorCategory::Validation,
        400..=499 => ErrorCategory::Fatal,
        _ => ErrorCategory::ServerError,
    }
}

/// Error for a non-success response; the body is truncated for the message
pub fn status_error(target: &str, status: StatusCode, body: &str) -> CallError {
    let snippet: String = body.trim().chars().take(MAX_BODY_CHARS).collect();
    let message = if snippet.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, snippet)
    };
    CallError::new(target, classify_status(status), message)
}

/// Error for a request that never produced a usable response
pub fn transport_error(target: &str, err: &reqwest::Error) -> CallError {
    let category = if err.is_timeout() {
        ErrorCategory::Timeout
    } else if err.is_connect() {
        ErrorCategory::Network
    } else if err.is_decode() || err.is_body() {
        ErrorCategory::Validation
    } else if let Some(status) = err.status() {
        classify_status(status)
    } else {
        ErrorCategory::Network
    };
    CallError::new(target, category, err.to_string())
}

/// Read a response, turning non-success statuses into classified errors
pub async fn read_success(target: &str, response: reqwest::Response) -> Result<String, CallError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(target, &e))?;
    if !status.is_success() {
        return Err(status_error(target, status, &body));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (401, ErrorCategory::Authentication),
            (403, ErrorCategory::Authentication),
            (408, ErrorCategory::Timeout),
            (429, ErrorCategory::RateLimit),
            (400, ErrorCategory::Validation),
            (404, ErrorCategory::Validation),
            (422, ErrorCategory::Validation),
            (409, ErrorCategory::Fatal),
            (500, ErrorCategory::ServerError),
            (503, ErrorCategory::ServerError),
        ];
        for (code, expected) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(classify_status(status), expected, "status {}", code);
        }
    }

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(1000);
        let err = status_error("openai", StatusCode::BAD_GATEWAY, &body);
        assert_eq!(err.category, ErrorCategory::ServerError);
        assert_eq!(err.target, "openai");
        assert!(err.message.len() < 300);
        assert!(err.message.starts_with("HTTP 502"));
    }

    #[test]
    fn test_status_error_without_body() {
        let err = status_error("webhook", StatusCode::TOO_MANY_REQUESTS, "  ");
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert_eq!(err.message, "HTTP 429 Too Many Requests");
    }
}

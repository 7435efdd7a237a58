//! Shared HTTP response helpers for source clients.
//!
//! Centralizes status-code checks (404 as "no data", 429 rate limiting with
//! `Retry-After` parsing, non-success -> [`SourceError::Api`]) so individual
//! source modules stay focused on request construction and response mapping.

use crate::error::SourceError;

/// Check an HTTP response for common error conditions.
///
/// Returns `Ok(None)` for 404 and 204 (the source has nothing for this id),
/// `Ok(Some(resp))` on any other success. Handles:
/// - **429 Too Many Requests** -> [`SourceError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** -> [`SourceError::Api`] with status code and
///   response body.
pub async fn check_response(
    resp: reqwest::Response,
) -> Result<Option<reqwest::Response>, SourceError> {
    let status = resp.status();
    if status == 404 || status == 204 {
        return Ok(None);
    }
    if status == 429 {
        let retry_after = parse_retry_after(&resp);
        tracing::warn!(url = %resp.url(), retry_after, "source rate limited");
        return Err(SourceError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !status.is_success() {
        tracing::debug!(url = %resp.url(), status = status.as_u16(), "source returned an error status");
        return Err(SourceError::Api {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(Some(resp))
}

/// Decode a JSON body, reporting shape mismatches as [`SourceError::Parse`].
pub async fn json_body<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, SourceError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse(e.to_string()))
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(status: u16, value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Retry-After", value)
                .body("")
                .unwrap(),
        )
    }

    #[test]
    fn parse_retry_after_from_header() {
        let resp = mock_response_with_retry_after(429, "120");
        assert_eq!(parse_retry_after(&resp), 120);
    }

    #[test]
    fn parse_retry_after_non_numeric() {
        let resp = mock_response_with_retry_after(429, "Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(&resp), 60);
    }

    #[tokio::test]
    async fn rate_limited_default() {
        let err = check_response(mock_response(429, "")).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::RateLimited {
                retry_after_secs: 60
            }
        ));
    }

    #[tokio::test]
    async fn not_found_is_no_data() {
        assert!(check_response(mock_response(404, "")).await.unwrap().is_none());
        assert!(check_response(mock_response(204, "")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_keeps_body() {
        let err = check_response(mock_response(503, "maintenance"))
            .await
            .unwrap_err();
        match err {
            SourceError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let resp = check_response(mock_response(200, "{\"truncated\":"))
            .await
            .unwrap()
            .unwrap();
        let err = json_body::<serde_json::Value>(resp).await.unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}

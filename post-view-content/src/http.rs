//! HTTP client helper with native-tls support.

use crate::error::ContentError;
use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Validate that a content store base URL is usable.
///
/// Enforces:
/// - `http` or `https` scheme (plain http is allowed for local forums)
/// - a host component
/// - no query or fragment, since request paths are appended to it
pub fn validate_base_url(base_url: &str) -> Result<url::Url, ContentError> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| ContentError::InvalidUrl(format!("'{}': {}", base_url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ContentError::InvalidUrl(format!(
                "scheme '{}' rejected; only http and https are supported. URL: {}",
                scheme, base_url
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ContentError::InvalidUrl(format!(
            "'{}' has no host",
            base_url
        )));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ContentError::InvalidUrl(format!(
            "'{}' must not carry a query or fragment",
            base_url
        )));
    }

    Ok(parsed)
}

/// Create a new HTTP agent configured with native-tls and a global timeout.
pub fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// GET `url` and return the body bytes, capped at `limit`.
///
/// Non-2xx statuses surface as [`HttpFailure::Status`] so callers can map
/// them onto typed errors.
pub fn get_bytes(agent: &Agent, url: &str, limit: u64) -> Result<Vec<u8>, HttpFailure> {
    let response = agent
        .get(url)
        .header("Accept", "application/json")
        .header("User-Agent", "post-view")
        .call()
        .map_err(|e| match e {
            ureq::Error::StatusCode(code) => HttpFailure::Status(code),
            other => HttpFailure::Transport(format!("GET '{}': {}", url, other)),
        })?;

    response
        .into_body()
        .with_config()
        .limit(limit)
        .read_to_vec()
        .map_err(|e| {
            HttpFailure::Transport(format!(
                "failed to read response from '{}': {}. \
                 The response may have been truncated or exceeded {} bytes.",
                url, e, limit
            ))
        })
}

/// Raw outcome of a failed GET, before it is mapped onto [`ContentError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    Status(u16),
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert!(validate_base_url("https://forum.example.com").is_ok());
        assert!(validate_base_url("http://localhost:3000").is_ok());
        assert!(validate_base_url("https://example.com/forum").is_ok());
    }

    #[test]
    fn test_validate_rejects_other_schemes() {
        let err = validate_base_url("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, ContentError::InvalidUrl(_)));
        assert!(validate_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_rejects_query_and_garbage() {
        assert!(validate_base_url("https://example.com/?a=b").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}

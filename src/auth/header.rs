use thiserror::Error;
use warp::http::HeaderMap;
use warp::http::header::AUTHORIZATION;

pub const BEARER_SCHEME: &str = "Bearer ";
pub const API_KEY_SCHEME: &str = "ApiKey ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("authorization header is missing")]
    Missing,
    #[error("authorization header is malformed")]
    Malformed,
}

/// Token presented as `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, HeaderError> {
    extract_scheme(headers, BEARER_SCHEME)
}

/// Key presented as `Authorization: ApiKey <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, HeaderError> {
    extract_scheme(headers, API_KEY_SCHEME)
}

// Exact, case-sensitive prefix match; the remainder is returned untrimmed.
fn extract_scheme<'h>(headers: &'h HeaderMap, scheme: &str) -> Result<&'h str, HeaderError> {
    let value = headers.get(AUTHORIZATION).ok_or(HeaderError::Missing)?;
    let value = value.to_str().map_err(|_| HeaderError::Malformed)?;
    value.strip_prefix(scheme).ok_or(HeaderError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_returns_token_after_scheme() {
        let headers = headers_with("Bearer ABC123");
        assert_eq!(extract_bearer(&headers), Ok("ABC123"));
    }

    #[test]
    fn bearer_missing_header() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(HeaderError::Missing));
    }

    #[test]
    fn bearer_without_scheme_is_malformed() {
        let headers = headers_with("ABC123");
        assert_eq!(extract_bearer(&headers), Err(HeaderError::Malformed));
    }

    #[test]
    fn bearer_scheme_is_case_sensitive() {
        let headers = headers_with("bearer ABC123");
        assert_eq!(extract_bearer(&headers), Err(HeaderError::Malformed));
    }

    #[test]
    fn bearer_keeps_extra_whitespace() {
        let headers = headers_with("Bearer  ABC123");
        assert_eq!(extract_bearer(&headers), Ok(" ABC123"));
    }

    #[test]
    fn bearer_does_not_accept_api_key_scheme() {
        let headers = headers_with("ApiKey ABC123");
        assert_eq!(extract_bearer(&headers), Err(HeaderError::Malformed));
    }

    #[test]
    fn api_key_returns_key_after_scheme() {
        let headers = headers_with("ApiKey secret-key");
        assert_eq!(extract_api_key(&headers), Ok("secret-key"));
    }

    #[test]
    fn api_key_missing_and_malformed() {
        assert_eq!(extract_api_key(&HeaderMap::new()), Err(HeaderError::Missing));
        let headers = headers_with("Bearer secret-key");
        assert_eq!(extract_api_key(&headers), Err(HeaderError::Malformed));
    }

    #[test]
    fn non_ascii_header_value_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        assert_eq!(extract_bearer(&headers), Err(HeaderError::Malformed));
    }
}

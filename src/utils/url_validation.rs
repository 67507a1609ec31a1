//! Target URL validation.
//!
//! Target URLs that are already valid header text are stored exactly as
//! submitted (after trimming surrounding whitespace), so resolving a code
//! returns the same string that was shortened. Anything else (non-ASCII
//! characters, embedded control characters) is stored in the percent-encoded
//! form produced by [`Url`], which is always a valid `Location` value.

use url::Url;

/// Errors produced while validating a target URL.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS URLs are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a valid host")]
    MissingHost,
}

/// Validates an absolute http(s) URL and returns the string to store.
///
/// # Rules
///
/// 1. Must not be blank
/// 2. Must parse as an absolute URL
/// 3. Scheme must be `http` or `https` (rejects `javascript:`, `data:`, `file:`, ...)
/// 4. Must carry a non-empty host
///
/// # Errors
///
/// Returns the first [`UrlValidationError`] rule that fails.
pub fn validate_target_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url =
        Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    if is_header_safe(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Ok(url.as_str().to_string())
    }
}

/// Visible ASCII only: the bytes a `Location` header accepts verbatim.
fn is_header_safe(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            validate_target_url("http://example.com").unwrap(),
            "http://example.com"
        );
        assert_eq!(
            validate_target_url("https://example.com/a/b?q=1#frag").unwrap(),
            "https://example.com/a/b?q=1#frag"
        );
    }

    #[test]
    fn test_preserves_original_text() {
        let url = "https://EXAMPLE.com:443/Path";
        assert_eq!(validate_target_url(url).unwrap(), url);
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            validate_target_url("  https://example.com/x \n").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_non_ascii_is_percent_encoded() {
        assert_eq!(
            validate_target_url("https://example.com/päth").unwrap(),
            "https://example.com/p%C3%A4th"
        );
        assert_eq!(
            validate_target_url("https://bücher.example/").unwrap(),
            "https://xn--bcher-kva.example/"
        );
    }

    #[test]
    fn test_embedded_control_characters_removed() {
        let stored = validate_target_url("https://example.com/a\tb\nc").unwrap();
        assert_eq!(stored, "https://example.com/abc");
        assert!(stored.bytes().all(|b| b.is_ascii_graphic()));
    }

    #[test]
    fn test_blank_rejected() {
        assert_eq!(validate_target_url("   "), Err(UrlValidationError::Empty));
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(matches!(
            validate_target_url("example.com/path"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_dangerous_schemes_rejected() {
        for input in [
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "file:///etc/passwd",
            "ftp://example.com/file.txt",
            "mailto:test@example.com",
        ] {
            assert_eq!(
                validate_target_url(input),
                Err(UrlValidationError::UnsupportedProtocol),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_ip_and_port_hosts() {
        assert!(validate_target_url("http://192.168.1.1:8080/api").is_ok());
        assert!(validate_target_url("http://[::1]:3000/").is_ok());
        assert!(validate_target_url("http://localhost:3000/test").is_ok());
    }

    #[test]
    fn test_very_long_url() {
        let url = format!("https://example.com/{}", "a".repeat(2000));
        assert!(validate_target_url(&url).is_ok());
    }
}

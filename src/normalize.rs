//! URL normalization and validation
//!
//! Pure, synchronous canonicalization of user-supplied address strings.
//! No network access happens here.

use crate::ScreenshotError;
use url::Url;

/// Normalize a raw URL string into its canonical absolute form.
///
/// Surrounding whitespace is trimmed and a missing scheme defaults to
/// `https://`, so `"  example.com "` and `"https://example.com"` normalize
/// to the same string. Anything that still fails to parse as an absolute
/// URL is rejected.
///
/// # Examples
///
/// ```rust
/// use screenshot_server::normalize_url;
///
/// assert_eq!(normalize_url("example.com").unwrap(), "https://example.com/");
/// assert!(normalize_url("not a url").is_err());
/// ```
pub fn normalize_url(raw: &str) -> Result<String, ScreenshotError> {
    let trimmed = raw.trim();

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed =
        Url::parse(&with_scheme).map_err(|_| ScreenshotError::InvalidUrl(raw.to_string()))?;

    Ok(parsed.to_string())
}

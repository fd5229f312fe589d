//! Request target resolution so equal requests map to equal store keys.

use url::Url;

/// Error type for target resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request target against the site origin, as a page would.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Parse relative to `origin` (`/quran`, `quran` and `//host/x` all resolve)
/// 3. Lowercase the host (done by the parser)
/// 4. Reject schemes other than http and https
/// 5. Remove fragment (#...), which never reaches the server
/// 6. Keep query string intact (do not reorder)
pub fn resolve(origin: &Url, target: &str) -> Result<Url, UrlError> {
    let trimmed = target.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = Url::options()
        .base_url(Some(origin))
        .parse(trimmed)
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    finish(parsed)
}

fn finish(mut url: Url) -> Result<Url, UrlError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    url.set_fragment(None);
    Ok(url)
}

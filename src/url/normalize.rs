use crate::url::domain::extract_authority;
use crate::{UrlError, UrlResult};
use url::Url;

/// The scheme and authority every page of a crawled site is fetched under
///
/// Only the origin of the submitted URL is kept: pages are addressed as
/// `scheme://authority` followed by a frontier path, so any path on the
/// submitted URL is not part of the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRoot {
    pub scheme: String,
    /// Lowercase host plus any explicit, non-default port
    pub authority: String,
}

impl SiteRoot {
    /// Builds the absolute URL for a frontier path
    ///
    /// The root page is the empty path, so it renders without a trailing
    /// slash.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_harvester::url::normalize_site_url;
    ///
    /// let root = normalize_site_url("example.com").unwrap();
    /// assert_eq!(root.page_url(""), "http://example.com");
    /// assert_eq!(root.page_url("/about"), "http://example.com/about");
    /// ```
    pub fn page_url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.authority, path)
    }

    /// The site's authority with a leading `www.` removed
    ///
    /// Discovered links are compared against this, so `www.example.com`
    /// accepts links to `example.com` and to `blog.example.com`.
    pub fn match_authority(&self) -> &str {
        self.authority
            .strip_prefix("www.")
            .unwrap_or(&self.authority)
    }
}

/// Normalizes a submitted site URL into its crawl root
///
/// # Normalization Steps
///
/// 1. Trim whitespace; reject if empty
/// 2. Prepend `http://` unless the URL already starts with `http://` or `https://`
/// 3. Parse the URL; reject if malformed
/// 4. Require an HTTP(S) scheme and a host
///
/// # Arguments
///
/// * `url_str` - The URL exactly as submitted, scheme optional
///
/// # Returns
///
/// * `Ok(SiteRoot)` - Scheme and authority to crawl under
/// * `Err(UrlError)` - The URL cannot be crawled
pub fn normalize_site_url(url_str: &str) -> UrlResult<SiteRoot> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let authority =
        extract_authority(&url).ok_or_else(|| UrlError::MissingHost(trimmed.to_string()))?;

    Ok(SiteRoot {
        scheme: url.scheme().to_string(),
        authority,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepends_http() {
        let root = normalize_site_url("example.com").unwrap();
        assert_eq!(root.scheme, "http");
        assert_eq!(root.authority, "example.com");
    }

    #[test]
    fn test_keeps_https() {
        let root = normalize_site_url("https://example.com").unwrap();
        assert_eq!(root.scheme, "https");
        assert_eq!(root.page_url(""), "https://example.com");
    }

    #[test]
    fn test_drops_submitted_path() {
        let root = normalize_site_url("http://example.com/blog/post?x=1").unwrap();
        assert_eq!(root.page_url(""), "http://example.com");
        assert_eq!(root.page_url("/about"), "http://example.com/about");
    }

    #[test]
    fn test_keeps_explicit_port() {
        let root = normalize_site_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(root.authority, "127.0.0.1:8080");
        assert_eq!(root.page_url("/x"), "http://127.0.0.1:8080/x");
    }

    #[test]
    fn test_lowercases_host() {
        let root = normalize_site_url("HTTP://WWW.Example.COM").unwrap();
        assert_eq!(root.scheme, "http");
        assert_eq!(root.authority, "www.example.com");
        assert_eq!(root.match_authority(), "example.com");
    }

    #[test]
    fn test_trims_whitespace() {
        let root = normalize_site_url("  example.com \n").unwrap();
        assert_eq!(root.authority, "example.com");
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(normalize_site_url("   "), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_rejects_unparseable() {
        assert!(normalize_site_url("http://exa mple.com").is_err());
        assert!(normalize_site_url("http://").is_err());
    }
}

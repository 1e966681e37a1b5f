use crate::url::domain::extract_authority;
use crate::url::matcher::is_same_site;
use crate::url::SiteRoot;
use tracing::{debug, warn};
use url::{ParseError, Url};

/// Base that relative anchors are resolved against
///
/// Only the resulting path is kept, so the host is never fetched.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Decides whether a discovered anchor joins the crawl frontier
///
/// # Filter Steps
///
/// 1. Reject `data:` payload references
/// 2. Trim whitespace and parse; relative references are resolved to a path
/// 3. Reject non-HTTP(S) targets such as `mailto:` or `javascript:`
/// 4. Reject empty targets and links to the root path `/`
/// 5. Reject paths ending in an avoided extension (case-sensitive)
/// 6. Accept relative links and links whose authority contains the site's
///
/// # Arguments
///
/// * `raw` - The anchor's `href` exactly as it appears in the page
/// * `site` - Root of the site being crawled
/// * `avoided_extensions` - Path suffixes that are never fetched
///
/// # Returns
///
/// * `Some(String)` - The path to append, with exactly one leading slash
/// * `None` - The link is not crawled
///
/// # Examples
///
/// ```
/// use site_harvester::url::{filter_link, normalize_site_url};
///
/// let site = normalize_site_url("example.com").unwrap();
/// let avoided = vec![".pdf".to_string()];
///
/// assert_eq!(filter_link("about", &site, &avoided), Some("/about".to_string()));
/// assert_eq!(filter_link("/", &site, &avoided), None);
/// assert_eq!(filter_link("/report.pdf", &site, &avoided), None);
/// assert_eq!(filter_link("https://other.org/x", &site, &avoided), None);
/// ```
pub fn filter_link(raw: &str, site: &SiteRoot, avoided_extensions: &[String]) -> Option<String> {
    if raw.trim_start().get(..5).map_or(false, |p| p.eq_ignore_ascii_case("data:")) {
        return None;
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (authority, path) = match Url::parse(trimmed) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                debug!(link = trimmed, "Skipping non-HTTP link");
                return None;
            }
            (extract_authority(&url), url.path().to_string())
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            let resolved = Url::parse(RELATIVE_BASE).and_then(|base| base.join(trimmed));
            match resolved {
                // Protocol-relative anchors ("//host/path") carry their own host
                Ok(url) => match extract_authority(&url) {
                    Some(host) if host != "relative.invalid" => (Some(host), url.path().to_string()),
                    _ => (None, url.path().to_string()),
                },
                Err(e) => {
                    warn!(link = trimmed, error = %e, "Skipping malformed link");
                    return None;
                }
            }
        }
        Err(e) => {
            warn!(link = trimmed, error = %e, "Skipping malformed link");
            return None;
        }
    };

    if path.is_empty() && authority.is_none() {
        return None;
    }
    if path == "/" {
        return None;
    }

    if avoided_extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
        debug!(link = trimmed, "Skipping avoided extension");
        return None;
    }

    let normalized = format!("/{}", path.trim_start_matches('/'));

    match authority {
        None => Some(normalized),
        Some(ref target) if is_same_site(site.match_authority(), target) => Some(normalized),
        Some(_) => {
            debug!(link = trimmed, "Skipping off-site link");
            None
        }
    }
}

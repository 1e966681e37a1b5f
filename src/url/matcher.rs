/// Checks whether a link's authority belongs to the site being crawled
///
/// The match is a substring test: the link is on-site if it contains the
/// site's authority (already stripped of `www.`). This accepts the bare
/// domain, `www.` and any other subdomain, and is deliberately permissive.
///
/// # Arguments
///
/// * `site_authority` - The crawled site's authority without `www.`
/// * `candidate` - The authority of a discovered link
///
/// # Examples
///
/// ```
/// use site_harvester::url::is_same_site;
///
/// assert!(is_same_site("example.com", "example.com"));
/// assert!(is_same_site("example.com", "blog.example.com"));
/// assert!(!is_same_site("example.com", "example.org"));
/// ```
pub fn is_same_site(site_authority: &str, candidate: &str) -> bool {
    candidate.contains(site_authority)
}

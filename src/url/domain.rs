use url::Url;

/// Extracts the authority (host and explicit port) from a URL
///
/// The host is lowercased. Default ports are never included because the
/// `url` crate drops them while parsing.
///
/// # Returns
///
/// * `Some(String)` - e.g. `example.com` or `127.0.0.1:8080`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvester::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://localhost:3000/").unwrap();
/// assert_eq!(extract_authority(&url), Some("localhost:3000".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }

    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

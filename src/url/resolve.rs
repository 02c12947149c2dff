use url::Url;

/// Resolves an article link against the site origin
///
/// Relative hrefs are joined onto `origin`. Absolute http(s) hrefs are kept
/// as they are. Returns None for hrefs that cannot name an article:
/// - empty or whitespace-only values
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - anything that does not resolve to an http(s) URL
///
/// # Examples
///
/// ```
/// use listing_harvester::url::resolve_article_url;
/// use url::Url;
///
/// let origin = Url::parse("https://www.yaga-burundi.com").unwrap();
/// assert_eq!(
///     resolve_article_url(&origin, "/2024/une-histoire/"),
///     Some("https://www.yaga-burundi.com/2024/une-histoire/".to_string())
/// );
/// assert_eq!(resolve_article_url(&origin, ""), None);
/// ```
pub fn resolve_article_url(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match origin.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

//! URL handling for listings and articles
//!
//! This module derives storage keys from listing URLs and turns relative
//! article links into absolute URLs.

mod key;
mod resolve;

pub use key::ListingKey;
pub use resolve::resolve_article_url;

use crate::UrlError;
use url::Url;

/// Parses a configured site origin
///
/// # Examples
///
/// ```
/// use listing_harvester::url::parse_origin;
///
/// let origin = parse_origin("https://www.yaga-burundi.com/").unwrap();
/// assert_eq!(origin.host_str(), Some("www.yaga-burundi.com"));
/// ```
pub fn parse_origin(origin: &str) -> Result<Url, UrlError> {
    let url = Url::parse(origin).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    Ok(url)
}

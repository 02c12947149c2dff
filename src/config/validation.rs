use crate::config::types::{BrowserConfig, Config, OutputConfig, SelectorConfig, TraversalConfig};
use crate::url::ListingKey;
use crate::{ConfigError, UrlError};
use scraper::Selector;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let origin = validate_origin(&config.site.origin)?;
    validate_traversal_config(&config.traversal)?;
    validate_selectors(&config.selectors)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    validate_listings(&config.listings, &origin)?;
    Ok(())
}

/// Validates the site origin and returns it parsed
fn validate_origin(origin: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site origin '{}': {}", origin, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Site origin '{}' must use http or https",
            origin
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site origin '{}' has no host",
            origin
        )));
    }

    if url.path() != "/" || url.query().is_some() {
        return Err(ConfigError::Validation(format!(
            "Site origin '{}' must not carry a path or query",
            origin
        )));
    }

    Ok(url)
}

/// Validates load-more loop limits
fn validate_traversal_config(config: &TraversalConfig) -> Result<(), ConfigError> {
    // load_more_delay_ms >= 0 is always true for u64; zero disables the pause

    if config.max_expansions < 1 {
        return Err(ConfigError::Validation(format!(
            "max_expansions must be >= 1, got {}",
            config.max_expansions
        )));
    }

    if config.listing_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "listing_timeout_secs must be >= 1, got {}",
            config.listing_timeout_secs
        )));
    }

    if config.max_listings < 1 {
        return Err(ConfigError::Validation(format!(
            "max_listings must be >= 1, got {}",
            config.max_listings
        )));
    }

    Ok(())
}

/// Checks that every configured selector is valid CSS
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.load_more_holder,
        &config.load_more_button,
        &config.article,
        &config.header,
        &config.category,
        &config.title,
        &config.title_link,
        &config.author,
        &config.posted_at,
    ] {
        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            selector: selector.clone(),
            message: format!("{:?}", e),
        })?;
    }

    if config.hidden_class.is_empty() || config.hidden_class.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "hidden_class must be a single class name, got '{}'",
            config.hidden_class
        )));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if let Some(remote) = &config.remote_debugging_url {
        Url::parse(remote).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid remote_debugging_url '{}': {}", remote, e))
        })?;
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.storage_root.is_empty() {
        return Err(ConfigError::Validation(
            "storage_root cannot be empty".to_string(),
        ));
    }

    if config.merged_path.is_empty() {
        return Err(ConfigError::Validation(
            "merged_path cannot be empty".to_string(),
        ));
    }

    // Every .json file under the root is read back as a listing
    if lexical(&config.merged_path).starts_with(lexical(&config.storage_root)) {
        return Err(ConfigError::Validation(format!(
            "merged_path '{}' must be outside storage_root '{}'",
            config.merged_path, config.storage_root
        )));
    }

    Ok(())
}

/// Path with `.` components dropped, for prefix comparison
fn lexical(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Validates listing URLs against the site origin
fn validate_listings(listings: &[String], origin: &Url) -> Result<(), ConfigError> {
    for listing in listings {
        ListingKey::for_origin(listing, origin).map_err(|e| match e {
            UrlError::ForeignOrigin { .. } => ConfigError::Validation(format!(
                "Listing '{}' is not on the configured origin '{}'",
                listing, origin
            )),
            other => ConfigError::InvalidUrl(format!("Invalid listing URL '{}': {}", listing, other)),
        })?;
    }

    Ok(())
}

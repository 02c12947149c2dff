use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub listings: Vec<String>,
}

/// Site the listings belong to
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host prefixed to relative article links,
    /// e.g. "https://www.yaga-burundi.com"
    pub origin: String,
}

/// Load-more loop behavior
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalConfig {
    /// Pause after each load-more click (milliseconds)
    #[serde(rename = "load-more-delay-ms", default = "default_load_more_delay_ms")]
    pub load_more_delay_ms: u64,

    /// Upper bound on load-more clicks for a single listing
    #[serde(rename = "max-expansions", default = "default_max_expansions")]
    pub max_expansions: u32,

    /// Wall-clock budget for a single listing (seconds)
    #[serde(rename = "listing-timeout-secs", default = "default_listing_timeout_secs")]
    pub listing_timeout_secs: u64,

    /// Maximum number of listings visited in one run
    #[serde(rename = "max-listings", default = "default_max_listings")]
    pub max_listings: u32,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            load_more_delay_ms: default_load_more_delay_ms(),
            max_expansions: default_max_expansions(),
            listing_timeout_secs: default_listing_timeout_secs(),
            max_listings: default_max_listings(),
        }
    }
}

/// CSS selectors describing the listing markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "load-more-holder")]
    pub load_more_holder: String,

    #[serde(rename = "load-more-button")]
    pub load_more_button: String,

    /// Class set on the holder once nothing is left to load
    #[serde(rename = "hidden-class")]
    pub hidden_class: String,

    pub article: String,
    pub header: String,
    pub category: String,
    pub title: String,

    /// Anchor looked up inside the title node
    #[serde(rename = "title-link")]
    pub title_link: String,

    pub author: String,

    /// Element carrying the machine-readable `datetime` attribute
    #[serde(rename = "posted-at")]
    pub posted_at: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            load_more_holder: ".loadmore-holder".to_string(),
            load_more_button: ".loadmore-holder a".to_string(),
            hidden_class: "display_none".to_string(),
            article: "article.type-post".to_string(),
            header: "header.entry-header".to_string(),
            category: "span.subtitle".to_string(),
            title: "h2.entry-title".to_string(),
            title_link: "a".to_string(),
            author: ".author.vcard".to_string(),
            posted_at: "span.posted-on time".to_string(),
        }
    }
}

/// Headless browser session settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Attach to an already running Chrome instead of launching one
    #[serde(rename = "remote-debugging-url", default)]
    pub remote_debugging_url: Option<String>,

    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            remote_debugging_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which per-listing JSON files are mirrored
    #[serde(rename = "storage-root")]
    pub storage_root: String,

    /// Destination of the deduplicated export
    #[serde(rename = "merged-path", default = "default_merged_path")]
    pub merged_path: String,
}

fn default_load_more_delay_ms() -> u64 {
    1000
}

fn default_max_expansions() -> u32 {
    500
}

fn default_listing_timeout_secs() -> u64 {
    1200
}

fn default_max_listings() -> u32 {
    1000
}

fn default_headless() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_merged_path() -> String {
    "./articles.json".to_string()
}

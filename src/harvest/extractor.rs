//! Article metadata extraction from a rendered listing
//!
//! This module parses the expanded listing document and turns every
//! structurally complete article card into an `ArticleRecord`.

use crate::config::SelectorConfig;
use crate::store::ArticleRecord;
use crate::url::resolve_article_url;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled selectors for one article card
#[derive(Debug, Clone)]
struct CardSelectors {
    article: Selector,
    header: Selector,
    category: Selector,
    title: Selector,
    link: Selector,
    author: Selector,
    posted_at: Selector,
}

/// Extracts `ArticleRecord`s from listing HTML
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    selectors: CardSelectors,
    origin: Url,
}

impl RecordExtractor {
    /// Compiles the configured selectors
    ///
    /// # Arguments
    ///
    /// * `config` - Selector configuration
    /// * `origin` - Site origin prefixed to relative article links
    pub fn new(config: &SelectorConfig, origin: Url) -> Result<Self, ConfigError> {
        // The link is resolved under the header directly so it does not
        // depend on the title lookup succeeding
        let link = format!("{} {}", config.title, config.title_link);

        Ok(Self {
            selectors: CardSelectors {
                article: compile(&config.article)?,
                header: compile(&config.header)?,
                category: compile(&config.category)?,
                title: compile(&config.title)?,
                link: compile(&link)?,
                author: compile(&config.author)?,
                posted_at: compile(&config.posted_at)?,
            },
            origin,
        })
    }

    /// Extracts every complete article card in document order
    ///
    /// # Card Rules
    ///
    /// Within each article node's header, all of the following must resolve
    /// to a non-empty value, otherwise the card is skipped:
    /// - category label (text)
    /// - title (text)
    /// - article link (`href`, made absolute against the origin)
    /// - author (text)
    /// - publication timestamp (`datetime` attribute)
    ///
    /// Text values are trimmed. No deduplication is done.
    ///
    /// # Example
    ///
    /// ```
    /// use listing_harvester::config::SelectorConfig;
    /// use listing_harvester::harvest::RecordExtractor;
    /// use url::Url;
    ///
    /// let origin = Url::parse("https://www.yaga-burundi.com").unwrap();
    /// let extractor = RecordExtractor::new(&SelectorConfig::default(), origin).unwrap();
    ///
    /// let html = r#"<article class="type-post"><header class="entry-header">
    ///     <span class="subtitle">Culture</span>
    ///     <h2 class="entry-title"><a href="/2024/umuco/">Umuco</a></h2>
    ///     <span class="author vcard">Yaga</span>
    ///     <span class="posted-on"><time datetime="2024-01-02T09:00:00+02:00">2 jan</time></span>
    /// </header></article>"#;
    ///
    /// let records = extractor.extract(html);
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].url, "https://www.yaga-burundi.com/2024/umuco/");
    /// ```
    pub fn extract(&self, html: &str) -> Vec<ArticleRecord> {
        let document = Html::parse_document(html);

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for card in document.select(&self.selectors.article) {
            match self.extract_card(card) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} incomplete article cards", skipped);
        }

        records
    }

    /// Resolves all five fields of one card, each independently
    fn extract_card(&self, card: ElementRef<'_>) -> Option<ArticleRecord> {
        let header = card.select(&self.selectors.header).next()?;

        let category = first_text(header, &self.selectors.category);
        let title = first_text(header, &self.selectors.title);
        let url = first_attr(header, &self.selectors.link, "href")
            .and_then(|href| resolve_article_url(&self.origin, &href));
        let author = first_text(header, &self.selectors.author);
        let posted_at = first_attr(header, &self.selectors.posted_at, "datetime");

        Some(ArticleRecord {
            posted_at: posted_at?,
            author: author?,
            title: title?,
            url: url?,
            category: category?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Trimmed text of the first match, if non-empty
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trimmed attribute of the first match, if non-empty
fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

//! Scripted listing pages and an in-memory store for integration tests

use async_trait::async_trait;
use listing_harvester::config::{parse_config, Config};
use listing_harvester::harvest::{
    BrowserError, ListingPage, PageSource, ResourceKind, ResponseEvent, ResponseStream,
};
use listing_harvester::store::{ArticleRecord, ResultStore, StoreError, StoreResult};
use listing_harvester::url::ListingKey;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

pub const ORIGIN: &str = "https://www.yaga-burundi.com";

/// Test configuration with no pause between clicks
pub fn test_config(max_expansions: u32, listings: &[&str]) -> Config {
    let listings = listings
        .iter()
        .map(|l| format!("\"{}\"", l))
        .collect::<Vec<_>>()
        .join(", ");

    parse_config(&format!(
        r#"
listings = [{listings}]

[site]
origin = "{ORIGIN}"

[traversal]
load-more-delay-ms = 0
max-expansions = {max_expansions}
listing-timeout-secs = 30

[output]
storage-root = "./unused"
"#
    ))
    .expect("test config is valid")
}

/// A complete article card
pub fn card(slug: &str) -> String {
    format!(
        r#"<article class="post type-post">
            <header class="entry-header">
                <span class="subtitle">Culture</span>
                <h2 class="entry-title"><a href="/2024/{slug}/">Title {slug}</a></h2>
                <span class="author vcard">Author {slug}</span>
                <span class="posted-on"><time datetime="2024-02-02T10:00:00+02:00">2 fév</time></span>
            </header>
        </article>"#
    )
}

/// A card missing its author
pub fn incomplete_card(slug: &str) -> String {
    card(slug).replace("author vcard", "byline")
}

/// How the load-more control behaves once every batch is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEnd {
    /// Holder gets the hidden class, button stays in the DOM
    Hidden,
    /// Button is removed from the DOM
    Removed,
    /// Control never goes away; clicking loads nothing more
    Endless,
}

/// In-memory listing driven by a script of card batches
pub struct ScriptedPage {
    url: String,
    batches: Vec<Vec<String>>,
    end: ControlEnd,
    initially_absent: bool,
    error_on_click: Option<usize>,
    vanish_on_click: Option<usize>,
    stall_on_click: Option<usize>,
    clicks: AtomicUsize,
    queries: AtomicUsize,
    scrolls: AtomicUsize,
    reads: AtomicUsize,
    subscriptions: AtomicUsize,
    responder: Mutex<Option<UnboundedSender<ResponseEvent>>>,
}

impl ScriptedPage {
    pub fn new(listing: &str, batches: Vec<Vec<String>>) -> Self {
        Self {
            url: format!("{}{}", ORIGIN, listing),
            batches,
            end: ControlEnd::Hidden,
            initially_absent: false,
            error_on_click: None,
            vanish_on_click: None,
            stall_on_click: None,
            clicks: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            scrolls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
            responder: Mutex::new(None),
        }
    }

    pub fn ending(mut self, end: ControlEnd) -> Self {
        self.end = end;
        self
    }

    /// No load-more control at all
    pub fn without_control(mut self) -> Self {
        self.initially_absent = true;
        self
    }

    /// Emit a 414 response body when the `n`th click (1-based) happens
    pub fn uri_too_long_on_click(mut self, n: usize) -> Self {
        self.error_on_click = Some(n);
        self
    }

    /// The control disappears right before the `n`th click (1-based)
    pub fn vanish_on_click(mut self, n: usize) -> Self {
        self.vanish_on_click = Some(n);
        self
    }

    /// The `n`th click (1-based) never completes
    pub fn stall_on_click(mut self, n: usize) -> Self {
        self.stall_on_click = Some(n);
        self
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Every call into the page except `url()`
    pub fn interactions(&self) -> usize {
        self.clicks()
            + self.queries.load(Ordering::SeqCst)
            + self.scrolls.load(Ordering::SeqCst)
            + self.reads.load(Ordering::SeqCst)
            + self.subscriptions.load(Ordering::SeqCst)
    }

    fn shown_batches(&self) -> usize {
        (self.clicks() + 1).min(self.batches.len())
    }

    fn exhausted(&self) -> bool {
        self.clicks() + 1 >= self.batches.len()
    }

    fn button_present(&self) -> bool {
        if self.initially_absent {
            return false;
        }
        match self.end {
            ControlEnd::Removed => !self.exhausted(),
            ControlEnd::Hidden | ControlEnd::Endless => true,
        }
    }

    fn holder_hidden(&self) -> bool {
        self.end == ControlEnd::Hidden && self.exhausted()
    }
}

#[async_trait]
impl ListingPage for ScriptedPage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn exists(&self, _selector: &str) -> Result<bool, BrowserError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.button_present())
    }

    async fn has_class(&self, _selector: &str, _class: &str) -> Result<bool, BrowserError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.holder_hidden())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let n = self.clicks() + 1;

        if self.vanish_on_click == Some(n) {
            return Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
                message: "node is detached from document".to_string(),
            });
        }

        if self.stall_on_click == Some(n) {
            std::future::pending::<()>().await;
        }

        self.clicks.fetch_add(1, Ordering::SeqCst);

        let body = if self.error_on_click == Some(n) {
            "<html><head><title>414 Request-URI Too Long</title></head></html>".to_string()
        } else {
            "<article>more</article>".to_string()
        };

        if let Some(tx) = self.responder.lock().unwrap().as_ref() {
            let _ = tx.send(ResponseEvent {
                url: format!("{}/wp-admin/admin-ajax.php?paged={}", ORIGIN, n + 1),
                resource: ResourceKind::Xhr,
                body,
            });
        }

        Ok(())
    }

    async fn scroll_to_end(&self) -> Result<(), BrowserError> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let cards: Vec<String> = self
            .batches
            .iter()
            .take(self.shown_batches())
            .flatten()
            .cloned()
            .collect();

        Ok(format!(
            r##"<html><body><main>{}</main><div class="loadmore-holder"><a href="#">Load more</a></div></body></html>"##,
            cards.join("\n")
        ))
    }

    async fn responses(&mut self) -> Result<ResponseStream, BrowserError> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = unbounded_channel();
        *self.responder.lock().unwrap() = Some(tx);
        Ok(rx)
    }
}

/// Hands out pre-built scripted pages by listing URL
pub struct ScriptedSource {
    pages: Mutex<HashMap<String, ScriptedPage>>,
    pub opened: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages: Mutex::new(
                pages
                    .into_iter()
                    .map(|p| (p.url().to_string(), p))
                    .collect(),
            ),
            opened: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    type Page = ScriptedPage;

    async fn open(&self, listing_url: &str) -> Result<ScriptedPage, BrowserError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .remove(listing_url)
            .ok_or_else(|| BrowserError::Navigation {
                url: listing_url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
    }
}

/// Result store that counts writes
#[derive(Default)]
pub struct MemoryStore {
    pub sets: BTreeMap<ListingKey, Vec<ArticleRecord>>,
    pub writes: usize,
    pub reject_writes: bool,
}

impl MemoryStore {
    /// A store whose every write fails like a read-only disk
    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    pub fn with(key: &str, records: Vec<ArticleRecord>) -> Self {
        let mut store = Self::default();
        store.sets.insert(ListingKey::parse(key).unwrap(), records);
        store
    }
}

impl ResultStore for MemoryStore {
    fn has(&self, key: &ListingKey) -> StoreResult<bool> {
        Ok(self.sets.get(key).map(|r| !r.is_empty()).unwrap_or(false))
    }

    fn get(&self, key: &ListingKey) -> StoreResult<Option<Vec<ArticleRecord>>> {
        Ok(self.sets.get(key).cloned())
    }

    fn put(&mut self, key: &ListingKey, records: &[ArticleRecord]) -> StoreResult<()> {
        if self.reject_writes {
            return Err(StoreError::Io {
                path: format!("storage/{}.json", key),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only file system",
                ),
            });
        }

        self.writes += 1;
        self.sets.insert(key.clone(), records.to_vec());
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<ListingKey>> {
        Ok(self.sets.keys().cloned().collect())
    }
}

pub fn sample_record(slug: &str) -> ArticleRecord {
    ArticleRecord {
        posted_at: "2024-02-02T10:00:00+02:00".to_string(),
        author: format!("Author {}", slug),
        title: format!("Title {}", slug),
        url: format!("{}/2024/{}/", ORIGIN, slug),
        category: "Culture".to_string(),
    }
}

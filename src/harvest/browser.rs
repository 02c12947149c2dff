//! Chrome-backed listing pages
//!
//! This module handles the browser session for a harvest run:
//! - Launching Chrome, or attaching to a running instance
//! - Opening one isolated tab per listing
//! - Forwarding XHR/Fetch response bodies to the error monitor

use crate::config::BrowserConfig;
use crate::harvest::page::{BrowserError, ListingPage, ResourceKind, ResponseEvent, ResponseStream};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, ResourceType,
};
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;

const SCROLL_TO_END: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// A running browser shared by all listings of a harvest run
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launches Chrome, or connects to `remote-debugging-url` when configured
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let (browser, mut handler) = if let Some(url) = &config.remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.as_str())
                .await
                .map_err(|e| BrowserError::Launch(e.to_string()))?
        } else {
            let mut builder = ChromeConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(config.request_timeout_secs))
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage");

            if !config.headless {
                builder = builder.with_head();
            }

            let chrome_config = builder.build().map_err(BrowserError::Launch)?;
            Browser::launch(chrome_config)
                .await
                .map_err(|e| BrowserError::Launch(e.to_string()))?
        };

        // Drive the CDP connection until it closes
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Opens `listing_url` in a new tab and waits for it to load
    pub async fn open(&self, listing_url: &str) -> Result<ChromePage, BrowserError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| BrowserError::Navigation {
            url: listing_url.to_string(),
            message: e.to_string(),
        };

        let page = self
            .browser
            .new_page(listing_url)
            .await
            .map_err(navigation_error)?;
        page.wait_for_navigation().await.map_err(navigation_error)?;

        Ok(ChromePage {
            page,
            url: listing_url.to_string(),
            listener: None,
        })
    }

    /// Closes the browser and stops the connection handler
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        self.handler.abort();
    }
}

/// One listing opened in its own tab
pub struct ChromePage {
    page: Page,
    url: String,
    listener: Option<JoinHandle<()>>,
}

impl ChromePage {
    async fn eval_bool(&self, script: String) -> Result<bool, BrowserError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    /// Closes the tab
    pub async fn close(mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        if let Err(e) = self.page.clone().close().await {
            tracing::debug!("Failed to close tab for {}: {}", self.url, e);
        }
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

#[async_trait]
impl ListingPage for ChromePage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn exists(&self, selector: &str) -> Result<bool, BrowserError> {
        self.eval_bool(format!(
            "document.querySelector({}) !== null",
            js_string(selector)
        ))
        .await
    }

    async fn has_class(&self, selector: &str, class: &str) -> Result<bool, BrowserError> {
        self.eval_bool(format!(
            "(() => {{ const el = document.querySelector({}); return el !== null && el.classList.contains({}); }})()",
            js_string(selector),
            js_string(class)
        ))
        .await
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;

        element.click().await.map_err(|e| BrowserError::Click {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    async fn scroll_to_end(&self) -> Result<(), BrowserError> {
        self.page
            .evaluate(SCROLL_TO_END)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Content(e.to_string()))
    }

    async fn responses(&mut self) -> Result<ResponseStream, BrowserError> {
        let events_error = |e: chromiumoxide::error::CdpError| BrowserError::Events(e.to_string());

        self.page
            .execute(EnableParams::default())
            .await
            .map_err(events_error)?;
        let mut received = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(events_error)?;
        let mut finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(events_error)?;

        let (tx, rx) = unbounded_channel();
        let page = self.page.clone();

        let listener = tokio::spawn(async move {
            // Bodies are only available once loading finishes, so remember
            // background requests until then
            let mut pending: HashMap<String, (String, ResourceKind)> = HashMap::new();

            loop {
                tokio::select! {
                    Some(event) = received.next() => {
                        let resource = resource_kind(&event.r#type);
                        if resource.is_background() {
                            pending.insert(
                                event.request_id.inner().clone(),
                                (event.response.url.clone(), resource),
                            );
                        }
                    }
                    Some(event) = finished.next() => {
                        let Some((url, resource)) = pending.remove(event.request_id.inner()) else {
                            continue;
                        };

                        let body = match page
                            .execute(GetResponseBodyParams::new(event.request_id.clone()))
                            .await
                        {
                            Ok(response) if !response.result.base64_encoded => {
                                response.result.body.clone()
                            }
                            Ok(_) => continue,
                            Err(e) => {
                                tracing::debug!("No body for {}: {}", url, e);
                                continue;
                            }
                        };

                        if tx.send(ResponseEvent { url, resource, body }).is_err() {
                            break;
                        }
                    }
                    else => break,
                }
            }
        });

        if let Some(previous) = self.listener.replace(listener) {
            previous.abort();
        }

        Ok(rx)
    }
}

fn resource_kind(resource: &ResourceType) -> ResourceKind {
    match resource {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        _ => ResourceKind::Other,
    }
}

/// Quotes `value` as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

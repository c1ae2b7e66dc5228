// src/scrape/browser.rs
//! Shared chromiumoxide session plumbing for the browser-driven scrapers.
//! Each scraper owns one long-lived session; per-listing detail fetches go
//! through [`DetailTab`] so the side tab is closed on every exit path.

use anyhow::{anyhow, Context, Result};
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .args(vec![
                "--no-sandbox",
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--disable-extensions",
                "--disable-notifications",
                "--disable-popup-blocking",
                "--window-size=1920,1080",
            ])
            .build()
            .map_err(|e| anyhow!("Failed to configure headless browser: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch headless browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Let the browser settle before opening pages.
        sleep(Duration::from_millis(300)).await;

        Ok(Self {
            browser,
            handler_task,
        })
    }

    pub async fn open(&self, url: &str) -> Result<Page> {
        self.browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to open page: {}", url))
    }

    /// Deterministic shutdown; must be called on both success and failure
    /// paths once a scraper is done with the session.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

/// Scoped side tab for a single detail fetch. The results tab keeps focus
/// in its own `Page` handle, so "returning to the original window" is
/// simply closing this one - which `close()` does explicitly and `Drop`
/// flags when forgotten.
pub struct DetailTab {
    page: Option<Page>,
}

impl DetailTab {
    pub async fn open(session: &BrowserSession, url: &str) -> Result<Self> {
        let page = session.open(url).await?;
        Ok(Self { page: Some(page) })
    }

    pub fn page(&self) -> &Page {
        self.page.as_ref().expect("detail tab used after close")
    }

    pub async fn close(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close detail tab: {}", e);
            }
        }
    }
}

impl Drop for DetailTab {
    fn drop(&mut self) {
        if self.page.is_some() {
            warn!("Detail tab leaked without close(); browser shutdown will reap it");
        }
    }
}

/// Poll for an element until it appears or the timeout elapses.
pub async fn wait_for_element(page: &Page, selector: &str, timeout: Duration) -> Result<Element> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match page.find_element(selector).await {
            Ok(element) => return Ok(element),
            Err(e) => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(anyhow!("Timed out waiting for '{}': {}", selector, e));
                }
                sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

/// Poll until at least one element matches the selector.
pub async fn wait_for_elements(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Vec<Element>> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match page.find_elements(selector).await {
            Ok(elements) if !elements.is_empty() => return Ok(elements),
            _ => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(anyhow!("Timed out waiting for any '{}'", selector));
                }
                sleep(Duration::from_millis(500)).await;
            }
        }
    }
}

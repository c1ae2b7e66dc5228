// src/scrape/mod.rs
//! Per-site scrapers. Shared contract: `search(profile, limit)` returns at
//! most `limit` normalized job records from a fresh fetch of the site, and
//! degrades to whatever was collected instead of propagating failures.

pub mod browser;
pub mod glassdoor;
pub mod indeed;
pub mod linkedin;
pub mod selectors;

pub use glassdoor::GlassdoorScraper;
pub use indeed::IndeedScraper;
pub use linkedin::LinkedInScraper;

use std::time::Duration;
use tokio::time::sleep;

/// Fixed delay plus a small random jitter, used between listing fetches
/// and page turns to stay under anti-automation thresholds.
pub(crate) async fn pause(base_ms: u64, jitter_ms: u64) {
    let jitter = if jitter_ms > 0 {
        rand::random::<u64>() % jitter_ms
    } else {
        0
    };
    sleep(Duration::from_millis(base_ms + jitter)).await;
}

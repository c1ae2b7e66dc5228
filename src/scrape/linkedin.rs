// src/scrape/linkedin.rs
//! LinkedIn scraper. Plain HTTP against the public search pages, parsed
//! with the `scraper` crate; no browser session needed.

use super::pause;
use super::selectors::{element_text, first_attr, first_text};
use crate::types::{JobRecord, JobSource, SearchProfile, NOT_SPECIFIED};
use anyhow::{Context, Result};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

const PAGE_SIZE: usize = 25;
const MAX_FETCH_ATTEMPTS: usize = 3;

pub struct LinkedInScraper {
    client: Client,
    base_url: String,
}

impl LinkedInScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: "https://www.linkedin.com/jobs/search".to_string(),
        })
    }

    /// Free-form years ("2 years") mapped onto LinkedIn's ordinal `f_E`
    /// experience buckets; unparseable input lands on Associate.
    fn experience_bucket(experience: &str) -> u8 {
        let years: Option<f64> = experience
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok());

        match years {
            Some(y) if y <= 1.0 => 1, // Internship
            Some(y) if y <= 2.0 => 2, // Entry level
            Some(y) if y <= 3.0 => 3, // Associate
            Some(y) if y <= 8.0 => 4, // Mid-Senior level
            Some(_) => 5,             // Director
            None => 3,
        }
    }

    fn bucket_years(bucket: u8) -> &'static str {
        match bucket {
            1 => "0-1 years",
            2 => "0-2 years",
            3 => "2-3 years",
            4 => "3-8 years",
            5 => "8+ years",
            _ => NOT_SPECIFIED,
        }
    }

    fn job_type_param(job_nature: &str) -> &'static str {
        match job_nature.to_lowercase().as_str() {
            "onsite" => "1",
            "remote" => "2",
            "hybrid" => "3",
            _ => "1",
        }
    }

    fn build_search_url(&self, profile: &SearchProfile, bucket: u8, start: usize) -> Result<Url> {
        let bucket_param = bucket.to_string();
        let start_param = start.to_string();
        Url::parse_with_params(
            &format!("{}/", self.base_url),
            &[
                ("keywords", profile.position.as_str()),
                ("location", profile.location.as_str()),
                ("f_E", bucket_param.as_str()),
                ("f_WT", Self::job_type_param(&profile.job_nature)),
                ("start", start_param.as_str()),
            ],
        )
        .context("Failed to build LinkedIn search URL")
    }

    /// Results-page fetch with a small retry/backoff budget. Exhausting it
    /// is the caller's cue to stop paging and keep what was collected.
    async fn fetch_results_page(&self, url: &Url) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self
                .client
                .get(url.clone())
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(response) => {
                    return response
                        .text()
                        .await
                        .context("Failed to read LinkedIn results page body")
                }
                Err(e) if attempt < MAX_FETCH_ATTEMPTS => {
                    warn!(
                        "LinkedIn results fetch failed (attempt {}/{}): {}",
                        attempt, MAX_FETCH_ATTEMPTS, e
                    );
                    sleep(Duration::from_secs(1 << (attempt - 1))).await;
                }
                Err(e) => return Err(e).context("Failed to fetch LinkedIn results page"),
            }
        }
    }

    /// Parse one results page into records. Returns the raw card count as
    /// well so the caller can tell a short page from a filtered one.
    fn extract_cards(
        &self,
        html: &str,
        bucket: u8,
        profile: &SearchProfile,
    ) -> (usize, Vec<JobRecord>) {
        let document = Html::parse_document(html);
        let card_selector = match Selector::parse("div.base-card") {
            Ok(selector) => selector,
            Err(_) => return (0, Vec::new()),
        };

        let mut card_count = 0;
        let mut records = Vec::new();

        for card in document.select(&card_selector) {
            card_count += 1;

            // A card without its full link has no identity; skip it.
            let Some(link) = first_attr(card, &["a.base-card__full-link"], "href") else {
                continue;
            };

            let mut record = JobRecord::new(JobSource::LinkedIn);
            record.job_title = first_text(card, &["a.base-card__full-link"]).unwrap_or_default();
            record.apply_link = link.split('?').next().unwrap_or(&link).to_string();
            record.company =
                first_text(card, &["h4.base-search-card__subtitle"]).unwrap_or_default();
            record.location =
                first_text(card, &["span.job-search-card__location"]).unwrap_or_default();
            record.posted_date = first_text(
                card,
                &[
                    "time.job-search-card__listdate",
                    "time.job-search-card__listdate--new",
                ],
            )
            .unwrap_or_default();
            record.experience = Self::bucket_years(bucket).to_string();
            record.job_nature = profile.job_nature.clone();
            record.salary = if profile.salary.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                profile.salary.clone()
            };

            records.push(record);
        }

        (card_count, records)
    }

    fn parse_detail(html: &str) -> (String, BTreeMap<String, String>) {
        let document = Html::parse_document(html);

        let description = Selector::parse("div.show-more-less-html__markup")
            .ok()
            .and_then(|selector| document.select(&selector).next())
            .map(element_text)
            .unwrap_or_default();

        let mut criteria = BTreeMap::new();
        if let (Ok(item_sel), Ok(header_sel), Ok(value_sel)) = (
            Selector::parse("ul.description__job-criteria-list li.description__job-criteria-item"),
            Selector::parse("h3.description__job-criteria-subheader"),
            Selector::parse("span.description__job-criteria-text"),
        ) {
            for item in document.select(&item_sel) {
                let header = item.select(&header_sel).next().map(element_text);
                let value = item.select(&value_sel).next().map(element_text);
                if let (Some(header), Some(value)) = (header, value) {
                    if !header.is_empty() && !value.is_empty() {
                        criteria.insert(header, value);
                    }
                }
            }
        }

        (description, criteria)
    }

    /// Detail-page fetch is individually fail-soft: any failure yields an
    /// empty description instead of dropping the listing.
    async fn fetch_detail(&self, url: &str) -> (String, BTreeMap<String, String>) {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        let html = match response {
            Ok(response) => match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read job detail body from {}: {}", url, e);
                    return (String::new(), BTreeMap::new());
                }
            },
            Err(e) => {
                warn!("Failed to fetch job detail from {}: {}", url, e);
                return (String::new(), BTreeMap::new());
            }
        };

        Self::parse_detail(&html)
    }

    pub async fn search(&self, profile: &SearchProfile, limit: usize) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = Vec::new();
        let bucket = Self::experience_bucket(&profile.experience);
        let mut page = 0usize;

        info!(
            "Starting LinkedIn job search for {} in {}",
            profile.position, profile.location
        );

        while jobs.len() < limit {
            let url = match self.build_search_url(profile, bucket, page * PAGE_SIZE) {
                Ok(url) => url,
                Err(e) => {
                    error!("{}", e);
                    break;
                }
            };

            info!("Fetching LinkedIn results page {}", page + 1);
            let html = match self.fetch_results_page(&url).await {
                Ok(html) => html,
                Err(e) => {
                    error!("Giving up on LinkedIn results: {}", e);
                    break;
                }
            };

            let (card_count, records) = self.extract_cards(&html, bucket, profile);
            if card_count == 0 {
                info!("No more jobs found on LinkedIn");
                break;
            }

            for mut record in records {
                info!("Fetching description for job: {}", record.job_title);
                let (description, criteria) = self.fetch_detail(&record.apply_link).await;
                record.description = description;
                record.job_criteria = criteria;

                jobs.push(record);
                if jobs.len() >= limit {
                    break;
                }
                pause(1_000, 500).await;
            }

            if card_count < PAGE_SIZE {
                break;
            }
            page += 1;
            pause(1_000, 500).await;
        }

        info!("LinkedIn search completed. Found {} jobs", jobs.len());
        jobs.truncate(limit);
        jobs
    }
}

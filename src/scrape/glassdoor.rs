// src/scrape/glassdoor.rs
//! Glassdoor scraper. Browser-driven and two-phased: the search bar is
//! filled in like a user would, card links are collected from the results
//! page, then the main tab visits each listing for its full description.
//! Class names carry build hashes, so selectors match on stable prefixes.

use super::browser::{wait_for_element, BrowserSession};
use super::pause;
use super::selectors::{element_text, first_text};
use crate::types::{JobRecord, JobSource, SearchProfile, NOT_SPECIFIED};
use anyhow::Result;
use chromiumoxide::Page;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct GlassdoorScraper {
    session: Option<BrowserSession>,
    base_url: String,
}

impl GlassdoorScraper {
    /// Browser launch failure turns the scraper into a no-op returning
    /// empty results instead of failing the whole request.
    pub async fn new() -> Self {
        let session = match BrowserSession::launch().await {
            Ok(session) => Some(session),
            Err(e) => {
                error!("Failed to initialize browser for Glassdoor: {}", e);
                None
            }
        };

        Self {
            session,
            base_url: "https://www.glassdoor.com/Job".to_string(),
        }
    }

    /// The job-title anchor sits three levels deep inside its card; climb
    /// back up so company/location/salary lookups stay scoped to the card.
    fn card_container(card: ElementRef) -> ElementRef {
        let mut current = card;
        for _ in 0..3 {
            match current.parent().and_then(ElementRef::wrap) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    fn extract_links(html: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(html);
        let title_selector = match Selector::parse("a[class*='JobCard_jobTitle']") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        let mut records = Vec::new();
        for card in document.select(&title_selector) {
            let Some(href) = card.value().attr("href") else {
                continue;
            };
            let container = Self::card_container(card);

            let mut record = JobRecord::new(JobSource::Glassdoor);
            record.job_title = element_text(card);
            record.apply_link = if href.starts_with('/') {
                format!("https://www.glassdoor.com{}", href)
            } else {
                href.to_string()
            };
            record.company = first_text(
                container,
                &[
                    "span[class*='EmployerProfile_compactEmployerName']",
                    "[class*='EmployerProfile_profileContainer']",
                ],
            )
            .unwrap_or_default();
            record.location =
                first_text(container, &["div[class*='JobCard_location']"]).unwrap_or_default();
            record.salary = first_text(container, &["div[class*='JobCard_salaryEstimate']"])
                .unwrap_or_else(|| NOT_SPECIFIED.to_string());
            record.easy_apply = Some(
                if first_text(container, &["div[class*='JobCard_easyApplyTag']"]).is_some() {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                },
            );

            records.push(record);
        }

        records
    }

    /// "N years" scan near the experience phrases the description uses.
    fn derive_experience(description: &str) -> Option<String> {
        let lower = description.to_lowercase();
        let mentions = ["years of experience", "year experience", "years experience"]
            .iter()
            .any(|term| lower.contains(term));
        if !mentions {
            return None;
        }

        for years in 0..15 {
            if description.contains(&format!("{}+", years))
                || description.contains(&format!("{}-", years))
                || description.contains(&format!("{} ", years))
            {
                return Some(format!("{} years", years));
            }
        }
        None
    }

    fn derive_job_nature(description: &str) -> Option<String> {
        let lower = description.to_lowercase();
        if lower.contains("remote") {
            Some("remote".to_string())
        } else if lower.contains("hybrid") {
            Some("hybrid".to_string())
        } else if lower.contains("on-site") || lower.contains("onsite") {
            Some("onsite".to_string())
        } else {
            None
        }
    }

    async fn open_search(&self, session: &BrowserSession, profile: &SearchProfile) -> Result<Page> {
        info!("Opening Glassdoor Jobs");
        let page = session.open(&self.base_url).await?;
        pause(5_000, 0).await;

        info!("Entering position: {}", profile.position);
        let position_input =
            wait_for_element(&page, "#searchBar-jobTitle", Duration::from_secs(10)).await?;
        position_input.click().await?;
        position_input.type_str(&profile.position).await?;
        pause(2_000, 0).await;

        info!("Entering location: {}", profile.location);
        let location_input =
            wait_for_element(&page, "#searchBar-location", Duration::from_secs(10)).await?;
        location_input.click().await?;
        location_input.type_str(&profile.location).await?;
        pause(2_000, 0).await;

        location_input.press_key("Enter").await?;
        pause(5_000, 0).await;

        Ok(page)
    }

    /// Navigates the main tab to the listing and fills in description,
    /// derived experience and job nature. Returns whether the description
    /// was actually read; failures leave the record as collected in
    /// phase 1.
    async fn fill_details(&self, page: &Page, record: &mut JobRecord) -> bool {
        info!(
            "Getting Glassdoor details for: {} at {}",
            record.job_title, record.company
        );

        if let Err(e) = page.goto(record.apply_link.as_str()).await {
            warn!("Failed to open Glassdoor job page: {}", e);
            return false;
        }
        pause(5_000, 0).await;

        // Expand the truncated description when the control is present.
        if let Ok(show_more) = page
            .find_element("[class*='JobDetails_showMoreWrapper']")
            .await
        {
            if show_more.click().await.is_ok() {
                pause(2_000, 0).await;
            }
        }

        match wait_for_element(
            page,
            "[class*='JobDetails_jobDescription']",
            Duration::from_secs(10),
        )
        .await
        {
            Ok(element) => {
                if let Ok(Some(text)) = element.inner_text().await {
                    let description = text.trim().to_string();
                    if let Some(experience) = Self::derive_experience(&description) {
                        record.experience = experience;
                    }
                    if let Some(nature) = Self::derive_job_nature(&description) {
                        record.job_nature = nature;
                    }
                    record.description = description;
                    return true;
                }
                false
            }
            Err(e) => {
                warn!("Failed to read Glassdoor job description: {}", e);
                false
            }
        }
    }

    /// A field the heuristics could not derive stays "Not specified" when
    /// the listing page was read; the profile's value only stands in when
    /// the detail fetch itself failed.
    fn resolve_missing(value: String, fetched: bool, profile_value: &str) -> String {
        if !value.is_empty() {
            return value;
        }
        if !fetched && !profile_value.is_empty() {
            return profile_value.to_string();
        }
        NOT_SPECIFIED.to_string()
    }

    pub async fn search(&self, profile: &SearchProfile, limit: usize) -> Vec<JobRecord> {
        let Some(session) = &self.session else {
            warn!("Glassdoor scraper is disabled (no browser session)");
            return Vec::new();
        };

        info!("Phase 1: Collecting Glassdoor job links");
        let page = match self.open_search(session, profile).await {
            Ok(page) => page,
            Err(e) => {
                error!("Glassdoor search failed: {}", e);
                return Vec::new();
            }
        };

        let mut records = match page.content().await {
            Ok(html) => Self::extract_links(&html),
            Err(e) => {
                error!("Failed to read Glassdoor results page: {}", e);
                Vec::new()
            }
        };
        records.truncate(limit);
        info!("Collected {} Glassdoor job links", records.len());

        info!("Phase 2: Getting detailed information for each Glassdoor job");
        let mut detailed = Vec::new();
        for mut record in records {
            let fetched = self.fill_details(&page, &mut record).await;

            record.experience =
                Self::resolve_missing(record.experience, fetched, &profile.experience);
            record.job_nature =
                Self::resolve_missing(record.job_nature, fetched, &profile.job_nature);

            detailed.push(record);
            pause(2_000, 0).await;
        }

        if let Err(e) = page.close().await {
            debug!("Failed to close Glassdoor results tab: {}", e);
        }
        info!("Glassdoor search completed. Found {} jobs", detailed.len());
        detailed
    }

    pub async fn close(self) {
        if let Some(session) = self.session {
            session.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_scopes_fields_to_the_card() {
        let html = r#"
            <li>
              <div class="EmployerProfile_profileContainer__xyz">
                <span class="EmployerProfile_compactEmployerName__9MGcV">Acme</span>
              </div>
              <div><div><a class="JobCard_jobTitle__GLyJ1" href="/partner/job1">Backend Engineer</a></div></div>
              <div class="JobCard_location__Ds1fM">Islamabad</div>
              <div class="JobCard_salaryEstimate__QpbTW">PKR 250K</div>
              <div class="JobCard_easyApplyTag__5vlo5">Easy Apply</div>
            </li>
            <li>
              <div><div><a class="JobCard_jobTitle__GLyJ1" href="https://www.glassdoor.com/job2">Data Engineer</a></div></div>
            </li>"#;

        let records = GlassdoorScraper::extract_links(html);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].job_title, "Backend Engineer");
        assert_eq!(
            records[0].apply_link,
            "https://www.glassdoor.com/partner/job1"
        );
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].location, "Islamabad");
        assert_eq!(records[0].salary, "PKR 250K");
        assert_eq!(records[0].easy_apply.as_deref(), Some("Yes"));
        assert_eq!(records[0].source, JobSource::Glassdoor);

        assert_eq!(records[1].apply_link, "https://www.glassdoor.com/job2");
        assert_eq!(records[1].salary, NOT_SPECIFIED);
        assert_eq!(records[1].easy_apply.as_deref(), Some("No"));
    }

    #[test]
    fn test_derive_experience() {
        assert_eq!(
            GlassdoorScraper::derive_experience("We need 3+ years of experience with Rust"),
            Some("3 years".to_string())
        );
        assert_eq!(
            GlassdoorScraper::derive_experience("No formal requirements here"),
            None
        );
    }

    #[test]
    fn test_derive_job_nature_prefers_remote() {
        assert_eq!(
            GlassdoorScraper::derive_job_nature("This is a fully Remote role"),
            Some("remote".to_string())
        );
        assert_eq!(
            GlassdoorScraper::derive_job_nature("Hybrid schedule, 2 days onsite"),
            Some("hybrid".to_string())
        );
        assert_eq!(
            GlassdoorScraper::derive_job_nature("Strictly on-site in Lahore"),
            Some("onsite".to_string())
        );
        assert_eq!(GlassdoorScraper::derive_job_nature("nothing stated"), None);
    }

    #[test]
    fn test_resolve_missing_prefers_profile_only_on_fetch_failure() {
        assert_eq!(
            GlassdoorScraper::resolve_missing("3 years".to_string(), true, "2 years"),
            "3 years"
        );
        assert_eq!(
            GlassdoorScraper::resolve_missing(String::new(), true, "2 years"),
            NOT_SPECIFIED
        );
        assert_eq!(
            GlassdoorScraper::resolve_missing(String::new(), false, "2 years"),
            "2 years"
        );
        assert_eq!(
            GlassdoorScraper::resolve_missing(String::new(), false, ""),
            NOT_SPECIFIED
        );
    }

    #[tokio::test]
    async fn test_search_without_session_is_a_noop() {
        let scraper = GlassdoorScraper {
            session: None,
            base_url: "https://www.glassdoor.com/Job".to_string(),
        };
        let profile = SearchProfile {
            position: "Engineer".to_string(),
            experience: "2 years".to_string(),
            salary: String::new(),
            job_nature: "remote".to_string(),
            location: "Islamabad".to_string(),
            skills: "Python".to_string(),
        };
        assert!(scraper.search(&profile, 5).await.is_empty());
    }
}

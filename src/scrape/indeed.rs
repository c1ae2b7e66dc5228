// src/scrape/indeed.rs
//! Indeed scraper. The site needs a running script engine to render its
//! results, so this one drives a headless browser session; descriptions
//! are fetched through a side tab per listing.

use super::browser::{wait_for_element, wait_for_elements, BrowserSession, DetailTab};
use super::pause;
use super::selectors::{first_attr, first_text};
use crate::types::{JobRecord, JobSource, SearchProfile, NOT_SPECIFIED};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct IndeedScraper {
    session: Option<BrowserSession>,
    base_url: String,
    pages: usize,
}

impl IndeedScraper {
    /// Browser launch failure turns the scraper into a no-op returning
    /// empty results instead of failing the whole request.
    pub async fn new(pages: usize) -> Self {
        let session = match BrowserSession::launch().await {
            Ok(session) => Some(session),
            Err(e) => {
                error!("Failed to initialize browser for Indeed: {}", e);
                None
            }
        };

        Self {
            session,
            base_url: "https://pk.indeed.com".to_string(),
            pages,
        }
    }

    fn build_search_url(&self, profile: &SearchProfile) -> String {
        let mut url = format!(
            "{}/jobs?q={}&l={}",
            self.base_url,
            profile.position.replace(' ', "+"),
            profile.location.replace(' ', "+"),
        );

        match profile.job_nature.to_lowercase().as_str() {
            "onsite" => url.push_str("&sc=0kf%3Ajt(fulltime)%3B"),
            "remote" => url.push_str("&sc=0kf%3Aattr(DSQF7)%3B"),
            _ => {}
        }

        url
    }

    fn extract_cards(&self, html: &str, profile: &SearchProfile) -> Vec<JobRecord> {
        let document = Html::parse_document(html);
        let card_selector = match Selector::parse("div.job_seen_beacon") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        let mut records = Vec::new();
        for card in document.select(&card_selector) {
            let mut record = JobRecord::new(JobSource::Indeed);
            record.job_title = first_text(card, &["h2.jobTitle"]).unwrap_or_default();
            record.apply_link = first_attr(card, &["h2.jobTitle a"], "href")
                .map(|href| {
                    if href.starts_with('/') {
                        format!("{}{}", self.base_url, href)
                    } else {
                        href
                    }
                })
                .unwrap_or_default();
            record.company =
                first_text(card, &["[data-testid=\"company-name\"]"]).unwrap_or_default();
            record.location = first_text(
                card,
                &["div.companyLocation", "[data-testid=\"text-location\"]"],
            )
            .unwrap_or_default();
            record.salary = first_text(
                card,
                &["div.salary-snippet", "div.salary-snippet-container"],
            )
            .unwrap_or_else(|| {
                if profile.salary.is_empty() {
                    NOT_SPECIFIED.to_string()
                } else {
                    profile.salary.clone()
                }
            });
            record.posted_date = first_text(card, &["span.date"]).unwrap_or_default();
            record.experience = if profile.experience.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                profile.experience.clone()
            };
            record.job_nature = if profile.job_nature.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                profile.job_nature.clone()
            };

            if record.job_title.is_empty() && record.apply_link.is_empty() {
                continue;
            }
            records.push(record);
        }

        records
    }

    /// Opens the listing in a side tab, reads the description, and closes
    /// the tab again on every path. Failure yields "" for this listing.
    async fn fetch_description(&self, session: &BrowserSession, url: &str) -> String {
        let tab = match DetailTab::open(session, url).await {
            Ok(tab) => tab,
            Err(e) => {
                warn!("Failed to open Indeed detail tab: {}", e);
                return String::new();
            }
        };

        let description =
            match wait_for_element(tab.page(), "#jobDescriptionText", Duration::from_secs(10))
                .await
            {
                Ok(element) => match element.inner_text().await {
                    Ok(Some(text)) => text.trim().to_string(),
                    _ => String::new(),
                },
                Err(e) => {
                    warn!("No job description found at {}: {}", url, e);
                    String::new()
                }
            };

        tab.close().await;
        description
    }

    pub async fn search(&self, profile: &SearchProfile, limit: usize) -> Vec<JobRecord> {
        let Some(session) = &self.session else {
            warn!("Indeed scraper is disabled (no browser session)");
            return Vec::new();
        };

        let mut jobs = Vec::new();
        let url = self.build_search_url(profile);
        info!("Starting Indeed job search at {}", url);

        let page = match session.open(&url).await {
            Ok(page) => page,
            Err(e) => {
                error!("{}", e);
                return jobs;
            }
        };
        pause(3_000, 0).await;

        'pages: for page_index in 0..self.pages {
            info!("Scraping Indeed page {}", page_index + 1);

            if let Err(e) =
                wait_for_elements(&page, "div.job_seen_beacon", Duration::from_secs(10)).await
            {
                warn!("No job cards found on this Indeed page: {}", e);
                break;
            }

            let html = match page.content().await {
                Ok(html) => html,
                Err(e) => {
                    error!("Failed to read Indeed results page: {}", e);
                    break;
                }
            };

            for mut record in self.extract_cards(&html, profile) {
                if !record.apply_link.is_empty() {
                    record.description = self.fetch_description(session, &record.apply_link).await;
                }
                info!(
                    "Found Indeed job: {} at {}",
                    record.job_title, record.company
                );
                jobs.push(record);
                if jobs.len() >= limit {
                    break 'pages;
                }
            }

            match page.find_element("a[aria-label=\"Next Page\"]").await {
                Ok(next) => {
                    if let Err(e) = next.click().await {
                        info!("No more Indeed pages available: {}", e);
                        break;
                    }
                    pause(2_000, 2_000).await;
                }
                Err(_) => {
                    info!("No more Indeed pages available");
                    break;
                }
            }
        }

        if let Err(e) = page.close().await {
            debug!("Failed to close Indeed results tab: {}", e);
        }
        info!("Indeed search completed. Found {} jobs", jobs.len());
        jobs
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

    fn profile(job_nature: &str) -> SearchProfile {
        SearchProfile {
            position: "Software Engineer".to_string(),
            experience: "2 years".to_string(),
            salary: String::new(),
            job_nature: job_nature.to_string(),
            location: "Islamabad Pakistan".to_string(),
            skills: "Python".to_string(),
        }
    }

    fn scraper() -> IndeedScraper {
        IndeedScraper {
            session: None,
            base_url: "https://pk.indeed.com".to_string(),
            pages: 1,
        }
    }

    #[test]
    fn test_build_search_url_encodes_filters() {
        let scraper = scraper();

        let onsite = scraper.build_search_url(&profile("onsite"));
        assert!(onsite.starts_with("https://pk.indeed.com/jobs?q=Software+Engineer"));
        assert!(onsite.contains("&l=Islamabad+Pakistan"));
        assert!(onsite.ends_with("&sc=0kf%3Ajt(fulltime)%3B"));

        let remote = scraper.build_search_url(&profile("remote"));
        assert!(remote.ends_with("&sc=0kf%3Aattr(DSQF7)%3B"));

        let hybrid = scraper.build_search_url(&profile("hybrid"));
        assert!(!hybrid.contains("&sc="));
    }

    #[test]
    fn test_extract_cards_absolutizes_links_and_defaults() {
        let html = r#"
            <div class="job_seen_beacon">
              <h2 class="jobTitle"><a href="/rc/clk?jk=abc">Backend Engineer</a></h2>
              <span data-testid="company-name">Acme</span>
              <div class="companyLocation">Islamabad</div>
              <span class="date">Posted 3 days ago</span>
            </div>
            <div class="job_seen_beacon">
              <h2 class="jobTitle"><a href="https://pk.indeed.com/viewjob?jk=def">Data Engineer</a></h2>
              <div class="salary-snippet">Rs 200,000 a month</div>
            </div>"#;

        let records = scraper().extract_cards(html, &profile("remote"));
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].apply_link, "https://pk.indeed.com/rc/clk?jk=abc");
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].salary, NOT_SPECIFIED);
        assert_eq!(records[0].posted_date, "Posted 3 days ago");
        assert_eq!(records[0].source, JobSource::Indeed);
        assert_eq!(records[0].job_nature, "remote");

        assert_eq!(records[1].apply_link, "https://pk.indeed.com/viewjob?jk=def");
        assert_eq!(records[1].salary, "Rs 200,000 a month");
        assert_eq!(records[1].company, "");
    }

    #[tokio::test]
    async fn test_search_without_session_is_a_noop() {
        let jobs = scraper().search(&profile("remote"), 10).await;
        assert!(jobs.is_empty());
    }
}

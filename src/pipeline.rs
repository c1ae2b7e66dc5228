// src/pipeline.rs
//! End-to-end job aggregation: scrape the three boards, run every batch
//! through the LLM filter, merge the surviving matches, and persist the
//! artifacts.

use crate::config::ConfigManager;
use crate::error::FilterError;
use crate::filter::{chunk, extract_json, GroqClient};
use crate::scrape::{GlassdoorScraper, IndeedScraper, LinkedInScraper};
use crate::types::{JobRecord, RelevantJob, SearchProfile};
use anyhow::Result;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Runs the full pipeline for one search profile. Failures are absorbed
/// per site and per batch so one broken board or one exhausted filter
/// call never empties the result; only missing Groq credentials at
/// client construction fail the call.
pub async fn process_jobs(
    config: &ConfigManager,
    profile: &SearchProfile,
) -> Result<Vec<RelevantJob>> {
    let jobs = scrape_all(config, profile).await;
    info!("Scraped {} jobs across all sources", jobs.len());

    let client = GroqClient::new(&config.groq)?;

    let batches = chunk(&jobs, config.scrape.batch_size);
    let batch_count = batches.len();
    let mut batch_results = Vec::with_capacity(batch_count);

    for (index, batch) in batches.into_iter().enumerate() {
        info!(
            "Filtering batch {}/{} ({} jobs)",
            index + 1,
            batch_count,
            batch.len()
        );
        batch_results.push(client.filter_batch(batch, profile).await);
    }

    let (relevant, raw_responses) = merge_batch_results(batch_results);
    info!("{} relevant jobs after filtering", relevant.len());

    persist_artifacts(config, &relevant, &raw_responses).await;

    Ok(relevant)
}

async fn scrape_all(config: &ConfigManager, profile: &SearchProfile) -> Vec<JobRecord> {
    let mut jobs = Vec::new();

    match LinkedInScraper::new() {
        Ok(scraper) => {
            let found = scraper.search(profile, config.scrape.linkedin_limit).await;
            info!("LinkedIn returned {} jobs", found.len());
            jobs.extend(found);
        }
        Err(e) => error!("Skipping LinkedIn, scraper failed to initialize: {}", e),
    }

    let indeed = IndeedScraper::new(config.scrape.indeed_pages).await;
    let found = indeed.search(profile, config.scrape.indeed_limit).await;
    info!("Indeed returned {} jobs", found.len());
    jobs.extend(found);
    indeed.close().await;

    let glassdoor = GlassdoorScraper::new().await;
    let found = glassdoor
        .search(profile, config.scrape.glassdoor_limit)
        .await;
    info!("Glassdoor returned {} jobs", found.len());
    jobs.extend(found);
    glassdoor.close().await;

    jobs
}

/// Folds the per-batch outcomes into the match list and the raw-response
/// log. A failed batch contributes no matches instead of failing the
/// whole request; the client already spent its retry budget by the time
/// an error lands here.
fn merge_batch_results(
    results: Vec<Result<String, FilterError>>,
) -> (Vec<RelevantJob>, Vec<String>) {
    let mut relevant = Vec::new();
    let mut raw_responses = Vec::new();

    for (index, result) in results.into_iter().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    "LLM filtering failed on batch {}, treating it as empty: {}",
                    index + 1,
                    e
                );
                continue;
            }
        };

        if raw.is_empty() {
            continue;
        }
        raw_responses.push(raw.clone());

        match extract_json(&raw) {
            Some(value) => relevant.extend(collect_matches(value)),
            None => warn!(
                "Could not recover JSON from batch {} response, skipping it",
                index + 1
            ),
        }
    }

    (relevant, raw_responses)
}

/// Pulls the `relevant_jobs` array out of one recovered response and
/// deserializes each entry. Entries the model mangled beyond repair are
/// dropped with a warning instead of poisoning the batch.
fn collect_matches(value: Value) -> Vec<RelevantJob> {
    let Some(entries) = value.get("relevant_jobs").and_then(Value::as_array) else {
        warn!("Recovered JSON has no relevant_jobs array, skipping it");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<RelevantJob>(entry.clone()) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!("Dropping malformed relevant job entry: {}", e);
                None
            }
        })
        .collect()
}

/// Best-effort persistence. The matches file is written every run, even
/// when empty, so stale results from a previous run never survive; raw
/// responses are only written when there is at least one. Write failures
/// are logged and never abort the request that produced the matches.
async fn persist_artifacts(
    config: &ConfigManager,
    relevant: &[RelevantJob],
    raw_responses: &[String],
) {
    if let Err(e) = write_matches(config, relevant).await {
        error!("Failed to persist combined matches: {:#}", e);
    }

    if raw_responses.is_empty() {
        return;
    }
    if let Err(e) = write_raw_responses(config, raw_responses).await {
        error!("Failed to persist raw LLM responses: {:#}", e);
    }
}

async fn write_matches(config: &ConfigManager, relevant: &[RelevantJob]) -> Result<()> {
    use anyhow::Context;

    let combined = json!({ "relevant_jobs": relevant });
    let body = serde_json::to_string_pretty(&combined)
        .context("Failed to serialize combined matches")?;
    tokio::fs::write(&config.output.matches_path, body)
        .await
        .with_context(|| format!("Failed to write {}", config.output.matches_path.display()))?;
    info!(
        "Wrote {} matches to {}",
        relevant.len(),
        config.output.matches_path.display()
    );
    Ok(())
}

async fn write_raw_responses(config: &ConfigManager, raw_responses: &[String]) -> Result<()> {
    use anyhow::Context;

    let body = serde_json::to_string_pretty(raw_responses)
        .context("Failed to serialize raw LLM responses")?;
    tokio::fs::write(&config.output.raw_responses_path, body)
        .await
        .with_context(|| {
            format!(
                "Failed to write {}",
                config.output.raw_responses_path.display()
            )
        })?;
    info!(
        "Wrote {} raw responses to {}",
        raw_responses.len(),
        config.output.raw_responses_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroqConfig, OutputConfig, ScrapeConfig};
    use serde_json::json;
    use std::path::Path;

    fn test_config(dir: &Path) -> ConfigManager {
        ConfigManager {
            output: OutputConfig {
                matches_path: dir.join("combined_job_matches.json"),
                raw_responses_path: dir.join("raw_llm_responses.json"),
            },
            scrape: ScrapeConfig {
                linkedin_limit: 25,
                indeed_pages: 1,
                indeed_limit: 25,
                glassdoor_limit: 25,
                batch_size: 3,
            },
            groq: GroqConfig {
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "deepseek-r1-distill-llama-70b".to_string(),
                temperature: 0.5,
                max_tokens: 8000,
                top_p: 0.9,
            },
        }
    }

    fn match_json() -> String {
        json!({
            "relevant_jobs": [{
                "job_title": "Software Engineer",
                "company": "Acme",
                "experience": "2 years",
                "jobNature": "onsite",
                "location": "Islamabad",
                "salary": "100,000 PKR",
                "apply_link": "https://example.com/job/1"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_collect_matches_reads_relevant_jobs_array() {
        let value = json!({
            "relevant_jobs": [
                {
                    "job_title": "Software Engineer",
                    "company": "Acme",
                    "experience": "2 years",
                    "jobNature": "onsite",
                    "location": "Islamabad",
                    "salary": "100,000 PKR",
                    "apply_link": "https://example.com/job/1"
                },
                {
                    "job_title": "Backend Engineer",
                    "company": "Globex",
                    "experience": null,
                    "jobNature": "remote",
                    "location": "Lahore",
                    "apply_link": "https://example.com/job/2"
                }
            ]
        });

        let matches = collect_matches(value);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].job_title, "Software Engineer");
        assert_eq!(matches[1].experience, "Not specified");
        assert_eq!(matches[1].salary, "Not specified");
    }

    #[test]
    fn test_collect_matches_without_the_expected_key() {
        assert!(collect_matches(json!({"jobs": []})).is_empty());
        assert!(collect_matches(json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_collect_matches_drops_unusable_entries() {
        let value = json!({
            "relevant_jobs": [
                "not an object",
                {
                    "job_title": "Data Engineer",
                    "company": "Initech",
                    "experience": "3 years",
                    "jobNature": "hybrid",
                    "location": "Karachi",
                    "salary": "150,000 PKR",
                    "apply_link": "https://example.com/job/3"
                }
            ]
        });

        let matches = collect_matches(value);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].company, "Initech");
    }

    #[test]
    fn test_failed_batch_contributes_no_matches_but_the_rest_survive() {
        let results = vec![
            Err(FilterError::RetriesExhausted {
                attempts: 3,
                source: Box::new(FilterError::EmptyResponse {
                    model: "deepseek-r1-distill-llama-70b".to_string(),
                }),
            }),
            Ok(match_json()),
            Ok(String::new()),
        ];

        let (relevant, raw_responses) = merge_batch_results(results);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].company, "Acme");
        assert_eq!(raw_responses.len(), 1);
    }

    #[test]
    fn test_unrecoverable_batch_response_is_logged_but_kept_raw() {
        let results = vec![Ok("no json here at all".to_string()), Ok(match_json())];
        let (relevant, raw_responses) = merge_batch_results(results);
        assert_eq!(relevant.len(), 1);
        assert_eq!(raw_responses.len(), 2);
    }

    #[tokio::test]
    async fn test_artifact_write_failure_does_not_abort() {
        let config = test_config(Path::new("/nonexistent-output-dir/for-jobscout"));
        persist_artifacts(&config, &[], &["raw response".to_string()]).await;
    }

    #[tokio::test]
    async fn test_matches_file_written_and_raw_file_skipped_when_empty() {
        let dir = std::env::temp_dir().join(format!("jobscout-artifacts-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let config = test_config(&dir);

        persist_artifacts(&config, &[], &[]).await;

        let body = tokio::fs::read_to_string(&config.output.matches_path)
            .await
            .unwrap();
        assert!(body.contains("relevant_jobs"));
        assert!(!config.output.raw_responses_path.exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}

// src/filter/groq.rs
//! Groq chat-completion client used to filter a batch of scraped jobs
//! against the search profile. Speaks the OpenAI-compatible wire format
//! over plain reqwest.

use crate::config::GroqConfig;
use crate::error::FilterError;
use crate::types::{JobRecord, SearchProfile};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const MAX_ATTEMPTS: usize = 3;
const BACKOFF_BASE_SECS: u64 = 4;
const BACKOFF_CAP_SECS: u64 = 10;

pub struct GroqClient {
    client: Client,
    api_key: String,
    config: GroqConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl GroqClient {
    /// The API key is resolved here, per request, so a missing key fails
    /// the call that needs it rather than the whole process. There is
    /// deliberately no baked-in fallback key.
    pub fn new(config: &GroqConfig) -> Result<Self> {
        let api_key =
            env::var("GROQ_API_KEY").context("GROQ_API_KEY environment variable not set")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        info!("GroqClient initialized with model: {}", config.model);

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    async fn try_completion(&self, prompt: &str) -> Result<String, FilterError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FilterError::Api { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| FilterError::EmptyResponse {
                model: self.config.model.clone(),
            })
    }

    /// Completion with a bounded retry/backoff budget; exhausting it
    /// surfaces a distinguished error instead of the raw transport error.
    pub async fn completion(&self, prompt: &str) -> Result<String, FilterError> {
        debug!(
            "Sending prompt to Groq (first 100 chars): {}",
            &prompt[..prompt.len().min(100)]
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_completion(prompt).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < MAX_ATTEMPTS && e.is_retryable() => {
                    let backoff = (BACKOFF_BASE_SECS << (attempt - 1)).min(BACKOFF_CAP_SECS);
                    warn!(
                        "Groq API call failed (attempt {}/{}), retrying in {}s: {}",
                        attempt, MAX_ATTEMPTS, backoff, e
                    );
                    sleep(Duration::from_secs(backoff)).await;
                }
                Err(e) => {
                    return Err(FilterError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    /// Submits one batch plus the profile and returns the raw model
    /// output. The answer is not guaranteed to be valid JSON; recovery is
    /// the caller's job. An empty batch skips the API call entirely.
    pub async fn filter_batch(
        &self,
        jobs: &[JobRecord],
        profile: &SearchProfile,
    ) -> Result<String, FilterError> {
        if jobs.is_empty() {
            info!("Empty job batch received, skipping API call");
            return Ok(String::new());
        }

        let jobs_json = serde_json::to_string_pretty(jobs).unwrap_or_default();
        let criteria_json = serde_json::to_string_pretty(profile).unwrap_or_default();
        let prompt = build_filter_prompt(&jobs_json, &criteria_json);

        self.completion(&prompt).await
    }
}

/// Fixed instruction template: reasoning in a think tag first, then a
/// single JSON object keyed `relevant_jobs` whose entries carry exactly
/// the seven canonical fields. The model is allowed to infer missing
/// fields, so answers are only best-effort traceable to the input batch.
fn build_filter_prompt(jobs_json: &str, criteria_json: &str) -> String {
    format!(
        "You are a job-matching assistant. Your task is to filter job listings based on specific criteria.\n\
         Here is a list of job listings (JSON array):\n\
         {jobs_json}\n\n\
         Here are the search criteria (JSON object):\n\
         {criteria_json}\n\n\
         Analyze the job listings and return a JSON object containing only the jobs that match ALL the provided criteria. If it even matches some criteria of skills approve it.\n\
         The response MUST be a JSON object with a single key named \"relevant_jobs\". The value of this key must be an array of job objects.\n\
         Each job object in the array MUST include exactly these fields: job_title, company, experience, jobNature, location, salary, apply_link.\n\
         Ensure the experience level (e.g., '2 years') and location (e.g., 'Islamabad, Pakistan') are matched appropriately. Consider salary ranges if provided.\n\
         If a job listing is missing one of the required fields (like 'salary' or 'apply_link'), attempt to infer it, represent it as 'Not Specified' or null, otherwise exclude the job if essential criteria cannot be verified.\n\
         VERY IMPORTANT: Show your thinking first in a think tag, then respond ONLY with the JSON object. Do NOT include any introductory text, explanations, apologies, or concluding remarks. The JSON response should start with `{{` and end with `}}`."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobRecord, JobSource};

    fn profile() -> SearchProfile {
        SearchProfile {
            position: "Software Engineer".to_string(),
            experience: "2 years".to_string(),
            salary: "70,000 PKR".to_string(),
            job_nature: "onsite".to_string(),
            location: "Islamabad".to_string(),
            skills: "Python".to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_jobs_and_criteria() {
        let mut job = JobRecord::new(JobSource::LinkedIn);
        job.job_title = "Backend Engineer".to_string();
        job.apply_link = "https://linkedin.com/jobs/view/1".to_string();

        let jobs_json = serde_json::to_string_pretty(&[job]).unwrap();
        let criteria_json = serde_json::to_string_pretty(&profile()).unwrap();
        let prompt = build_filter_prompt(&jobs_json, &criteria_json);

        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("\"jobNature\": \"onsite\""));
        assert!(prompt.contains("\"relevant_jobs\""));
        assert!(prompt.contains("think tag"));
        assert!(prompt.ends_with("The JSON response should start with `{` and end with `}`."));
    }

    #[test]
    fn test_backoff_schedule_is_capped() {
        let waits: Vec<u64> = (1..MAX_ATTEMPTS)
            .map(|attempt| (BACKOFF_BASE_SECS << (attempt - 1)).min(BACKOFF_CAP_SECS))
            .collect();
        assert_eq!(waits, vec![4, 8]);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_api_call() {
        std::env::set_var("GROQ_API_KEY", "test-key");
        let config = GroqConfig {
            base_url: "http://127.0.0.1:0".to_string(),
            model: "deepseek-r1-distill-llama-70b".to_string(),
            temperature: 0.5,
            max_tokens: 8000,
            top_p: 0.9,
        };
        let client = GroqClient::new(&config).unwrap();
        let raw = client.filter_batch(&[], &profile()).await.unwrap();
        assert!(raw.is_empty());
    }
}

// src/config.rs
//! Unified configuration management - single place that reads the environment

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub output: OutputConfig,
    pub scrape: ScrapeConfig,
    pub groq: GroqConfig,
}

/// Where the per-invocation artifacts land. Both files are overwritten
/// on every call, never appended.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub matches_path: PathBuf,
    pub raw_responses_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub linkedin_limit: usize,
    pub indeed_pages: usize,
    pub indeed_limit: usize,
    pub glassdoor_limit: usize,
    pub batch_size: usize,
}

/// Groq chat-completion settings. The API key itself is read lazily by the
/// client so a missing key fails the request, not the process.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let output = Self::load_output()?;
        let scrape = Self::load_scrape();
        let groq = Self::load_groq();

        Ok(Self {
            output,
            scrape,
            groq,
        })
    }

    fn load_output() -> Result<OutputConfig> {
        let base_dir = match std::env::var("JOBSCOUT_OUTPUT_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir().context("Failed to get current directory")?,
        };
        info!("Output directory: {}", base_dir.display());

        Ok(OutputConfig {
            matches_path: base_dir.join("combined_job_matches.json"),
            raw_responses_path: base_dir.join("raw_llm_responses.json"),
        })
    }

    fn load_scrape() -> ScrapeConfig {
        ScrapeConfig {
            linkedin_limit: env_usize("JOBSCOUT_LINKEDIN_LIMIT", 25),
            indeed_pages: env_usize("JOBSCOUT_INDEED_PAGES", 1),
            indeed_limit: env_usize("JOBSCOUT_INDEED_LIMIT", 25),
            glassdoor_limit: env_usize("JOBSCOUT_GLASSDOOR_LIMIT", 25),
            batch_size: env_usize("JOBSCOUT_BATCH_SIZE", 3),
        }
    }

    fn load_groq() -> GroqConfig {
        let base_url = std::env::var("GROQ_API_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());

        GroqConfig {
            base_url,
            model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "deepseek-r1-distill-llama-70b".to_string()),
            temperature: 0.5,
            max_tokens: 8000,
            top_p: 0.9,
        }
    }
}

fn env_usize(var: &str, default: usize) -> usize {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

//! Job aggregation service: scrapes LinkedIn, Indeed and Glassdoor for a
//! search profile, filters the combined results through a Groq-hosted
//! LLM, and serves the surviving matches over HTTP.

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod scrape;
pub mod types;
pub mod web;

pub use config::ConfigManager;
pub use types::{JobRecord, JobSource, RelevantJob, SearchProfile};
pub use web::start_web_server;

// src/types/job.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Sentinel used whenever a site does not expose a field.
pub const NOT_SPECIFIED: &str = "Not specified";

/// User-supplied search criteria, shared read-only across all scrapers
/// and the filter client. Wire names follow the public API contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProfile {
    pub position: String,
    pub experience: String,
    pub salary: String,
    #[serde(rename = "jobNature")]
    pub job_nature: String,
    pub location: String,
    pub skills: String,
}

/// Which site a job record was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobSource {
    LinkedIn,
    Indeed,
    Glassdoor,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::LinkedIn => "LinkedIn",
            JobSource::Indeed => "Indeed",
            JobSource::Glassdoor => "Glassdoor",
        }
    }
}

impl std::fmt::Display for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job listing as scraped from a site. Fields default to "" or the
/// "Not specified" sentinel at extraction time and are never mutated
/// afterwards. `apply_link` is the identity used for traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub apply_link: String,
    pub source: JobSource,
    pub experience: String,
    #[serde(rename = "jobNature")]
    pub job_nature: String,
    pub salary: String,
    pub posted_date: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub job_criteria: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_apply: Option<String>,
}

impl JobRecord {
    /// Empty record carrying only its source tag; scrapers fill in what
    /// they can extract.
    pub fn new(source: JobSource) -> Self {
        Self {
            job_title: String::new(),
            company: String::new(),
            location: String::new(),
            apply_link: String::new(),
            source,
            experience: String::new(),
            job_nature: String::new(),
            salary: String::new(),
            posted_date: String::new(),
            description: String::new(),
            job_criteria: BTreeMap::new(),
            easy_apply: None,
        }
    }
}

/// One entry of the model's `relevant_jobs` answer, re-confirmed to carry
/// the seven canonical fields. The model is allowed to answer `null` or
/// omit a field it could not infer; both collapse to the sentinel so the
/// record shape stays stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevantJob {
    #[serde(default = "not_specified", deserialize_with = "string_or_sentinel")]
    pub job_title: String,
    #[serde(default = "not_specified", deserialize_with = "string_or_sentinel")]
    pub company: String,
    #[serde(default = "not_specified", deserialize_with = "string_or_sentinel")]
    pub experience: String,
    #[serde(
        rename = "jobNature",
        default = "not_specified",
        deserialize_with = "string_or_sentinel"
    )]
    pub job_nature: String,
    #[serde(default = "not_specified", deserialize_with = "string_or_sentinel")]
    pub location: String,
    #[serde(default = "not_specified", deserialize_with = "string_or_sentinel")]
    pub salary: String,
    #[serde(default = "not_specified", deserialize_with = "string_or_sentinel")]
    pub apply_link: String,
}

fn not_specified() -> String {
    NOT_SPECIFIED.to_string()
}

fn string_or_sentinel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(not_specified))
}

// src/filter/mod.rs
//! LLM-backed relevance filtering: batching, the Groq client, and
//! recovery of JSON from free-form model output.

pub mod batch;
pub mod groq;
pub mod json_recovery;

pub use batch::chunk;
pub use groq::GroqClient;
pub use json_recovery::extract_json;

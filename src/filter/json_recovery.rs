// src/filter/json_recovery.rs
//! Best-effort recovery of a JSON object from free-form model output.
//! An ordered chain of pure parsing attempts; the first one that parses
//! wins and total failure is `None`, never an error.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Recovery order:
/// 1. fenced code block after the `</think>` delimiter
/// 2. bare `{...}` object after the delimiter
/// 3. any fenced code block in the whole response
/// 4. bare `{...}` object in the whole response
/// 5. the whole response as JSON
pub fn extract_json(response: &str) -> Option<Value> {
    if let Some((_, after_think)) = response.split_once("</think>") {
        let after_think = after_think.trim();

        if let Some(block) = fenced_blocks(after_think).into_iter().next() {
            if let Ok(value) = serde_json::from_str(&block) {
                return Some(value);
            }
            debug!("Failed to parse JSON from code block after think tag");
        }

        if let Some(value) = braced_object(after_think) {
            return Some(value);
        }
        debug!("Failed to parse JSON from text after think tag");
    }

    for block in fenced_blocks(response) {
        if let Ok(value) = serde_json::from_str(&block) {
            return Some(value);
        }
    }

    if let Some(value) = braced_object(response) {
        return Some(value);
    }

    serde_json::from_str(response).ok()
}

/// Contents of every ``` / ```json fence, in order of appearance.
fn fenced_blocks(text: &str) -> Vec<String> {
    let Ok(fence) = Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```") else {
        return Vec::new();
    };
    fence
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Greedy slice from the first `{` to the last `}`.
fn braced_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_think_delimited_payload_wins_over_outer_fence() {
        // The fenced block before the think tag carries a decoy payload.
        let response = concat!(
            "```json\n{\"relevant_jobs\": [\"decoy\"]}\n```\n",
            "<think>reasoning goes here</think>\n",
            "{\"relevant_jobs\": []}"
        );
        let value = extract_json(response).unwrap();
        assert_eq!(value, json!({"relevant_jobs": []}));
    }

    #[test]
    fn test_fenced_block_after_think_tag() {
        let response =
            "<think>hmm</think>\nHere you go:\n```json\n{\"relevant_jobs\": [1, 2]}\n```";
        let value = extract_json(response).unwrap();
        assert_eq!(value, json!({"relevant_jobs": [1, 2]}));
    }

    #[test]
    fn test_fenced_block_without_think_tag() {
        let response = "Sure!\n```\n{\"a\": 1}\n```\ntrailing prose";
        assert_eq!(extract_json(response).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_bare_object_in_prose() {
        let response = "The answer is {\"a\": {\"b\": 2}} as requested.";
        assert_eq!(extract_json(response).unwrap(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_whole_response_as_json() {
        assert_eq!(
            extract_json("{\"relevant_jobs\": []}").unwrap(),
            json!({"relevant_jobs": []})
        );
    }

    #[test]
    fn test_second_fence_parses_when_first_is_broken() {
        let response = "```\nnot json at all\n```\n```json\n{\"ok\": true}\n```";
        assert_eq!(extract_json(response).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_unrecoverable_is_none_not_error() {
        assert!(extract_json("no json anywhere").is_none());
        assert!(extract_json("").is_none());
        assert!(extract_json("<think>only thoughts</think>").is_none());
    }
}

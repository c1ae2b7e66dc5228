// src/scrape/selectors.rs
//! Fail-soft field extraction: every field maps to an ordered list of CSS
//! selectors, the first one that yields non-empty text wins, and a miss
//! produces `None` instead of an error.

use scraper::{ElementRef, Selector};

/// Walk the selector list in order and return the first non-empty text.
pub fn first_text(scope: ElementRef, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = scope.select(&selector).next() {
                let text = element_text(element);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Like [`first_text`] but reads an attribute off the first match.
pub fn first_attr(scope: ElementRef, selectors: &[&str], attr: &str) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = scope.select(&selector).next() {
                if let Some(value) = element.value().attr(attr) {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Concatenated, whitespace-normalized text of an element.
pub fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

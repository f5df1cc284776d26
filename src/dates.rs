//! Birth and death dates from three independent encodings, merged by priority.
//!
//! 1. Shorthand templates: `{{ДН|12|5|1900}}` gives birth `12.5.1900`, `{{ДС|...}}` death.
//! 2. Infobox arguments: `| дата народження = 12.05.1900` (first `D.M.Y` run of the value).
//! 3. Prose: the first parenthesized group of the plain text shaped like
//!    `(12 травня 1900 — 5 червня 1980)`.
//!
//! Each source yields a [`DateCandidate`]; a higher-priority source's field is never
//! replaced by a lower-priority one.

use crate::error::{Error, Result};
use crate::models::DateCandidate;
use crate::wikitext::{ParsedDocument, Template};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static BIRTH_ARG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"дата[\s|_]народження").unwrap());

static DEATH_ARG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"дата[\s|_]смерті").unwrap());

static NUMERIC_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}\.\d{1,2}\.\d{3,4}").unwrap());

static PROSE_DISALLOWED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-zА-Яа-яЁёЇїІіЄєҐґ0-9\s()—]").unwrap());

static PROSE_BIRTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\s*(\d{1,2}\s+\p{L}+\s+\d{3,4})").unwrap());

static PROSE_DEATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(.*?—\s*(\d{1,2}\s+\p{L}+\s+\d{3,4})").unwrap());

const BIRTH_TEMPLATE_PREFIX: &str = "дн";
const DEATH_TEMPLATE_PREFIX: &str = "дс";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    TemplateCall,
    Infobox,
    Prose,
}

impl DateSource {
    pub const DEFAULT_ORDER: [DateSource; 3] =
        [DateSource::TemplateCall, DateSource::Infobox, DateSource::Prose];
}

#[derive(Debug, Clone)]
pub struct DateExtractor {
    order: Vec<DateSource>,
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self {
            order: DateSource::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl DateExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources are consulted in the given order; earlier ones win conflicts.
    pub fn with_order(order: impl Into<Vec<DateSource>>) -> Self {
        Self {
            order: order.into(),
        }
    }

    pub fn order(&self) -> &[DateSource] {
        &self.order
    }

    pub fn extract(&self, doc: &ParsedDocument) -> Result<DateCandidate> {
        let mut merged = DateCandidate::default();
        for &source in &self.order {
            if merged.is_complete() {
                break;
            }
            let candidate = match source {
                DateSource::TemplateCall => from_template_calls(doc)?,
                DateSource::Infobox => from_infobox_arguments(doc),
                DateSource::Prose => from_prose(&doc.plain_text()),
            };
            if let Some(candidate) = candidate {
                debug!(
                    ?source,
                    birth = candidate.birth.as_deref(),
                    death = candidate.death.as_deref(),
                    "Date source contributed"
                );
                merged.fill_from(candidate);
            }
        }
        Ok(merged)
    }
}

/// Every shorthand template is checked, so a malformed one fails the page even when an
/// earlier template already supplied the date.
fn from_template_calls(doc: &ParsedDocument) -> Result<Option<DateCandidate>> {
    let mut found = DateCandidate::default();
    for template in doc.templates() {
        let name = template.normalized_name();
        if name.starts_with(BIRTH_TEMPLATE_PREFIX) {
            let date = join_date_parts(template)?;
            found.fill_from(DateCandidate::new(Some(date), None));
        } else if name.starts_with(DEATH_TEMPLATE_PREFIX) {
            let date = join_date_parts(template)?;
            found.fill_from(DateCandidate::new(None, Some(date)));
        }
    }
    Ok((!found.is_empty()).then_some(found))
}

fn join_date_parts(template: &Template) -> Result<String> {
    let parts: Vec<&str> = (1..=3).map_while(|i| template.positional_at(i)).collect();
    if parts.len() < 3 {
        return Err(Error::MalformedTemplateCall {
            name: template.name.clone(),
            found: parts.len(),
        });
    }
    Ok(parts.join("."))
}

fn from_infobox_arguments(doc: &ParsedDocument) -> Option<DateCandidate> {
    for template in doc.templates() {
        let mut found = DateCandidate::default();
        for (name, value) in template.named() {
            let name = name.trim().to_lowercase();
            let date = || NUMERIC_DATE_REGEX.find(value).map(|m| m.as_str().to_string());
            if BIRTH_ARG_REGEX.is_match(&name) {
                found.fill_from(DateCandidate::new(date(), None));
            }
            if DEATH_ARG_REGEX.is_match(&name) {
                found.fill_from(DateCandidate::new(None, date()));
            }
        }
        if !found.is_empty() {
            return Some(found);
        }
    }
    None
}

fn from_prose(text: &str) -> Option<DateCandidate> {
    for group in parenthesized_groups(text) {
        let cleaned = group.replace('\u{00A0}', " ");
        let cleaned = PROSE_DISALLOWED_REGEX.replace_all(&cleaned, "");
        let birth = PROSE_BIRTH_REGEX
            .captures(&cleaned)
            .map(|c| c[1].to_string());
        let death = PROSE_DEATH_REGEX
            .captures(&cleaned)
            .map(|c| c[1].to_string());
        if birth.is_some() || death.is_some() {
            return Some(DateCandidate::new(birth, death));
        }
    }
    None
}

/// Parenthesized spans in the order their closing bracket appears; inner groups come
/// before the groups enclosing them. Unmatched `)` are ignored.
pub fn parenthesized_groups(text: &str) -> Vec<&str> {
    let mut open = Vec::new();
    let mut groups = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '(' => open.push(i),
            ')' => {
                if let Some(start) = open.pop() {
                    groups.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    groups
}

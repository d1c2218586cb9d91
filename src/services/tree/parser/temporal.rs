//! Temporal response grammar.
//!
//! The model returns one JSON object, possibly wrapped in a code fence:
//!
//! ```json
//! {
//!   "inferredTimespan": { "start": "10,000 BCE", "end": "3,000 BCE" },
//!   "anchors": [
//!     { "title": "...", "scope": "...",
//!       "timeBoundaries": { "start": "...", "end": "..." },
//!       "historicalMeaningfulness": 8, "coverageNecessity": 9,
//!       "rationale": "..." }
//!   ],
//!   "coverageJustification": "..."
//! }
//! ```

use serde_json::Value;
use tracing::debug;

use fractal_history_core::{CandidateAnchor, TimeBoundaries};

use super::{clean_text, ResponseParser};
use crate::utils::error::{AppError, AppResult};

/// A parsed temporal response
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSelection {
    pub inferred_timespan: Option<TimeBoundaries>,
    pub anchors: Vec<CandidateAnchor>,
    pub coverage_justification: Option<String>,
}

/// Parser for JSON temporal responses
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalParser;

impl TemporalParser {
    /// Parse the whole document, keeping the timespan and justification.
    pub fn parse_selection(&self, raw: &str) -> AppResult<TemporalSelection> {
        let json_text = strip_code_fence(raw);
        let document: Value = serde_json::from_str(json_text)
            .map_err(|e| AppError::parse(format!("Response is not valid JSON: {}", e), raw))?;

        let entries = document
            .get("anchors")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::parse("Response JSON has no \"anchors\" array", raw))?;

        let mut anchors = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match parse_entry(entry, anchors.len() as u32 + 1) {
                Some(anchor) => anchors.push(anchor),
                None => debug!(index, "parser: dropping incomplete temporal entry"),
            }
        }

        if anchors.is_empty() {
            return Err(AppError::parse(
                "Response JSON contained no complete anchors",
                raw,
            ));
        }

        debug!(count = anchors.len(), "parser: temporal anchors parsed");
        Ok(TemporalSelection {
            inferred_timespan: document.get("inferredTimespan").and_then(boundaries),
            anchors,
            coverage_justification: text_field(&document, "coverageJustification"),
        })
    }
}

impl ResponseParser for TemporalParser {
    fn parse(&self, raw: &str) -> AppResult<Vec<CandidateAnchor>> {
        Ok(self.parse_selection(raw)?.anchors)
    }
}

/// The JSON body of a response: the contents of the first code fence, or the
/// whole trimmed response when there is no fence. Prose around an unfenced
/// object is not cut away; such a response fails to parse.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        // Optional language tag, on its own line or glued to the body
        let tag_len = after_fence
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after_fence.len());
        let content = &after_fence[tag_len..];
        if let Some(end) = content.find("```") {
            return content[..end].trim();
        }
    }

    trimmed
}

fn parse_entry(entry: &Value, position: u32) -> Option<CandidateAnchor> {
    let title = text_field(entry, "title")?;
    let scope = text_field(entry, "scope")?;
    let time_boundaries = entry.get("timeBoundaries").and_then(boundaries)?;
    let meaningfulness = entry.get("historicalMeaningfulness").and_then(rating)?;
    let necessity = entry.get("coverageNecessity").and_then(rating)?;

    Some(CandidateAnchor::temporal(
        title,
        scope,
        position,
        time_boundaries,
        meaningfulness,
        necessity,
        text_field(entry, "rationale"),
    ))
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(clean_text)
        .filter(|s| !s.is_empty())
}

fn boundary(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn boundaries(value: &Value) -> Option<TimeBoundaries> {
    Some(TimeBoundaries {
        start: value.get("start").and_then(boundary)?,
        end: value.get("end").and_then(boundary)?,
    })
}

/// A 1-10 rating given as a number or as text like "8" or "8/10".
/// Anything outside 1..=10 is rejected.
fn rating(value: &Value) -> Option<f64> {
    let rating = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.split('/').next()?.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (1.0..=10.0).contains(&rating).then_some(rating)
}

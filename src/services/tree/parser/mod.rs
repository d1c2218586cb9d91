//! Response Parsing
//!
//! Turns raw model output into ordered child candidates. Each axis has its
//! own grammar behind the `ResponseParser` trait; `parse` picks one once.

pub mod analytical;
pub mod temporal;

use fractal_history_core::{CandidateAnchor, GenerationAxis};

use crate::utils::error::AppResult;

pub use analytical::AnalyticalParser;
pub use temporal::{TemporalParser, TemporalSelection};

/// Extracts child candidates from a completion.
///
/// Implementations never return an empty list: when nothing can be
/// recovered they fail with a parse error carrying the raw text.
pub trait ResponseParser {
    fn parse(&self, raw: &str) -> AppResult<Vec<CandidateAnchor>>;
}

/// Parse `raw` with the grammar of `axis`.
pub fn parse(axis: GenerationAxis, raw: &str) -> AppResult<Vec<CandidateAnchor>> {
    match axis {
        GenerationAxis::Analytical => AnalyticalParser.parse(raw),
        GenerationAxis::Temporal => TemporalParser.parse(raw),
    }
}

/// Trim whitespace, bold markers and stray quote characters from a field value.
pub(crate) fn clean_text(value: &str) -> String {
    value
        .replace("**", "")
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’') || c.is_whitespace())
        .to_string()
}

//! Analytical response grammar.
//!
//! The model answers in four steps; only the STEP 3 final selection is read.
//! Each selected anchor is a numbered block:
//!
//! ```text
//! 1. **Plant Domestication**
//!    Scope: "Selection of wild cereals ..."
//!    Why essential: ...
//!    Causal: 8/10 | Human Impact: 7/10 | Final Score: 7.6
//! ```
//!
//! Without a STEP 3 marker, bare numbered or bulleted lines are taken as
//! titles with placeholder scope and default scores.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use fractal_history_core::{CandidateAnchor, CandidateDetail};

use super::{clean_text, ResponseParser};
use crate::utils::error::{AppError, AppResult};

/// Scope given to candidates recovered by the fallback grammar
pub const FALLBACK_SCOPE: &str = "Scope to be refined - generated from alternative parsing";

/// Default causal significance and human impact for fallback candidates
pub const FALLBACK_RATING: f64 = 7.0;

/// Most candidates the fallback grammar will return
pub const FALLBACK_LIMIT: usize = 5;

static FINAL_SELECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#*\s*STEP\s*3\s*:?\s*FINAL\s+SELECTION").expect("valid step 3 regex")
});

static NEXT_STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)#*\s*STEP\s*4\b").expect("valid step 4 regex"));

static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:\*\*)?(\d+)\.[ \t]+").expect("valid block regex"));

static SCOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ism)Scope\**\s*:\s*(.+?)\s*(?:(?:^[ \t]*|\|[ \t]*)(?:\*\*)?(?:Why essential|Causal(?:\s+Significance)?|Human\s+Impact|Final\s+Score|Type|Justification)\**\s*:|\z)",
    )
    .expect("valid scope regex")
});

static CAUSAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Causal(?:\s+Significance)?\**\s*:\**\s*(\d+(?:\.\d+)?)")
        .expect("valid causal regex")
});

static IMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Human\s+Impact\**\s*:\**\s*(\d+(?:\.\d+)?)").expect("valid impact regex")
});

static FINAL_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Final\s+Score\**\s*:\**\s*(\d+(?:\.\d+)?)").expect("valid final score regex")
});

static WHY_ESSENTIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Why\s+essential\**\s*:\s*([^\n]+)").expect("valid why regex")
});

static TITLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Title\s*:\s*").expect("valid title label regex"));

static FALLBACK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\d+\.[ \t]*|[-*][ \t]+)(?:Title:[ \t]*)?(.+?)[ \t]*$")
        .expect("valid fallback regex")
});

/// Parser for STEP-structured analytical responses
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticalParser;

impl ResponseParser for AnalyticalParser {
    fn parse(&self, raw: &str) -> AppResult<Vec<CandidateAnchor>> {
        let Some(section) = final_selection_section(raw) else {
            warn!(len = raw.len(), "parser: no STEP 3 marker, using fallback grammar");
            return parse_fallback(raw);
        };

        let candidates = parse_blocks(section);
        if candidates.is_empty() {
            return Err(AppError::parse(
                "STEP 3 final selection contained no complete anchor blocks",
                raw,
            ));
        }

        debug!(count = candidates.len(), "parser: analytical anchors parsed");
        Ok(candidates)
    }
}

/// Text between the STEP 3 marker and STEP 4 (or the end of the response).
fn final_selection_section(raw: &str) -> Option<&str> {
    let marker = FINAL_SELECTION.find(raw)?;
    let rest = &raw[marker.end()..];
    let end = NEXT_STEP.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_blocks(section: &str) -> Vec<CandidateAnchor> {
    let starts: Vec<(usize, usize)> = BLOCK_START
        .find_iter(section)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut candidates = Vec::new();
    for (index, &(_, body_start)) in starts.iter().enumerate() {
        let body_end = starts
            .get(index + 1)
            .map(|&(next_start, _)| next_start)
            .unwrap_or(section.len());
        let block = &section[body_start..body_end];

        match parse_block(block, candidates.len() as u32 + 1) {
            Some(candidate) => candidates.push(candidate),
            None => debug!(
                block = %block.lines().next().unwrap_or_default(),
                "parser: dropping incomplete anchor block"
            ),
        }
    }
    candidates
}

fn parse_block(block: &str, position: u32) -> Option<CandidateAnchor> {
    let first_line = block.lines().next()?;
    let title = clean_text(&TITLE_LABEL.replace(&first_line.replace("**", ""), ""));
    if title.is_empty() {
        return None;
    }

    let scope = SCOPE
        .captures(block)
        .map(|caps| clean_text(&caps[1]))
        .filter(|s| !s.is_empty())?;

    let causal = capture_number(&CAUSAL, block)?;
    let impact = capture_number(&IMPACT, block)?;
    let final_score = capture_number(&FINAL_SCORE, block)?;

    let mut candidate =
        CandidateAnchor::analytical(title, scope, position, causal, impact, final_score);
    if let Some(caps) = WHY_ESSENTIAL.captures(block) {
        candidate.detail = CandidateDetail::Analytical {
            why_essential: Some(clean_text(&caps[1])).filter(|w| !w.is_empty()),
        };
    }
    Some(candidate)
}

fn capture_number(pattern: &Regex, block: &str) -> Option<f64> {
    pattern.captures(block)?.get(1)?.as_str().parse().ok()
}

/// Bare numbered or bulleted lines as titles, with placeholder scope and
/// default scores.
fn parse_fallback(raw: &str) -> AppResult<Vec<CandidateAnchor>> {
    let mut candidates = Vec::new();

    for caps in FALLBACK_LINE.captures_iter(raw) {
        if candidates.len() >= FALLBACK_LIMIT {
            break;
        }
        let title = clean_text(&caps[1]);
        if title.is_empty() || title.to_uppercase() == title || title.starts_with("STEP") {
            continue;
        }

        candidates.push(CandidateAnchor::analytical(
            title,
            FALLBACK_SCOPE,
            candidates.len() as u32 + 1,
            FALLBACK_RATING,
            FALLBACK_RATING,
            FALLBACK_RATING,
        ));
    }

    if candidates.is_empty() {
        return Err(AppError::parse(
            "No STEP 3 final selection and no numbered or bulleted titles found",
            raw,
        ));
    }

    warn!(count = candidates.len(), "parser: fallback grammar recovered anchors");
    Ok(candidates)
}

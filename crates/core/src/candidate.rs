//! Parsed Child Candidates
//!
//! The structured output of the response parser. Every candidate carries the
//! uniform scoring fields (`causal_significance`, `human_impact`,
//! `final_score`) so downstream code can rank children from either axis the
//! same way; axis-specific data lives in `CandidateDetail`.

use serde::{Deserialize, Serialize};

/// Weight of causal significance (or historical meaningfulness) in the final score.
pub const CAUSAL_WEIGHT: f64 = 0.6;

/// Weight of human impact (or coverage necessity) in the final score.
pub const IMPACT_WEIGHT: f64 = 0.4;

/// Weighted composite score, rounded to two decimals.
pub fn final_score(causal: f64, impact: f64) -> f64 {
    let raw = causal * CAUSAL_WEIGHT + impact * IMPACT_WEIGHT;
    (raw * 100.0).round() / 100.0
}

/// Human-readable start and end of a temporal period ("10,000 BCE", "1945").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBoundaries {
    pub start: String,
    pub end: String,
}

/// Axis-specific payload of a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "lowercase")]
pub enum CandidateDetail {
    Analytical {
        #[serde(rename = "whyEssential", skip_serializing_if = "Option::is_none")]
        why_essential: Option<String>,
    },
    Temporal {
        #[serde(rename = "timeBoundaries")]
        time_boundaries: TimeBoundaries,
        #[serde(rename = "historicalMeaningfulness")]
        historical_meaningfulness: f64,
        #[serde(rename = "coverageNecessity")]
        coverage_necessity: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
}

/// One child proposed by the model, ready for identifier allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAnchor {
    pub title: String,
    pub scope: String,
    /// 1-based rank among the parsed candidates
    pub position: u32,
    pub causal_significance: f64,
    pub human_impact: f64,
    pub final_score: f64,
    pub detail: CandidateDetail,
}

impl CandidateAnchor {
    /// Build an analytical candidate.
    pub fn analytical(
        title: impl Into<String>,
        scope: impl Into<String>,
        position: u32,
        causal: f64,
        impact: f64,
        final_score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            scope: scope.into(),
            position,
            causal_significance: causal,
            human_impact: impact,
            final_score,
            detail: CandidateDetail::Analytical {
                why_essential: None,
            },
        }
    }

    /// Build a temporal candidate. Meaningfulness and necessity are mirrored
    /// onto the analytical scoring fields and the final score is recomputed.
    pub fn temporal(
        title: impl Into<String>,
        scope: impl Into<String>,
        position: u32,
        time_boundaries: TimeBoundaries,
        meaningfulness: f64,
        necessity: f64,
        rationale: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            scope: scope.into(),
            position,
            causal_significance: meaningfulness,
            human_impact: necessity,
            final_score: final_score(meaningfulness, necessity),
            detail: CandidateDetail::Temporal {
                time_boundaries,
                historical_meaningfulness: meaningfulness,
                coverage_necessity: necessity,
                rationale,
            },
        }
    }

    /// Time boundaries, for temporal candidates.
    pub fn time_boundaries(&self) -> Option<&TimeBoundaries> {
        match &self.detail {
            CandidateDetail::Temporal {
                time_boundaries, ..
            } => Some(time_boundaries),
            CandidateDetail::Analytical { .. } => None,
        }
    }
}

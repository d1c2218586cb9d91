//! Response Parser Integration Tests
//!
//! The prompt renderers and the parsers must agree: whatever the prompts show
//! the model as an example answer has to parse back into the same children.

use fractal_history::services::tree::parser::{self, analytical::FALLBACK_SCOPE, TemporalParser};
use fractal_history::services::tree::prompt::{render_analytical_response, render_temporal_response};
use fractal_history_core::{CandidateAnchor, CandidateDetail, GenerationAxis, TimeBoundaries};

fn analytical_candidates() -> Vec<CandidateAnchor> {
    vec![
        CandidateAnchor::analytical(
            "Plant Domestication",
            "Cultivation of wild cereals in the Fertile Crescent, ~10,000 BCE.",
            1,
            9.0,
            8.0,
            8.6,
        ),
        CandidateAnchor::analytical(
            "Writing Systems",
            "Cuneiform and hieroglyphs, ~3,200 BCE.",
            2,
            8.0,
            7.0,
            7.6,
        ),
    ]
}

fn temporal_candidates() -> Vec<CandidateAnchor> {
    vec![
        CandidateAnchor::temporal(
            "Early Neolithic: 10,000 - 7,000 BCE",
            "First cultivation and herding.",
            1,
            TimeBoundaries {
                start: "~10,000 BCE".to_string(),
                end: "~7,000 BCE".to_string(),
            },
            9.0,
            8.0,
            Some("Opens the span.".to_string()),
        ),
        CandidateAnchor::temporal(
            "Late Neolithic: 7,000 - 3,000 BCE",
            "Spread of farming and the first towns.",
            2,
            TimeBoundaries {
                start: "~7,000 BCE".to_string(),
                end: "~3,000 BCE".to_string(),
            },
            8.0,
            9.0,
            None,
        ),
    ]
}

#[test]
fn test_analytical_rendering_parses_back() {
    let expected = analytical_candidates();
    let rendered = render_analytical_response(&expected);

    let parsed = parser::parse(GenerationAxis::Analytical, &rendered).unwrap();
    assert_eq!(parsed.len(), expected.len());
    for (got, want) in parsed.iter().zip(&expected) {
        assert_eq!(got.title, want.title);
        assert_eq!(got.scope, want.scope);
        assert_eq!(got.position, want.position);
        assert_eq!(got.causal_significance, want.causal_significance);
        assert_eq!(got.human_impact, want.human_impact);
        assert_eq!(got.final_score, want.final_score);
        // The renderer fills in a justification the candidates did not carry
        assert!(matches!(
            &got.detail,
            CandidateDetail::Analytical { why_essential: Some(_) }
        ));
    }
}

#[test]
fn test_temporal_rendering_parses_back() {
    let expected = temporal_candidates();
    let timespan = TimeBoundaries {
        start: "~10,000 BCE".to_string(),
        end: "~3,000 BCE".to_string(),
    };
    let rendered = render_temporal_response(&timespan, &expected, "Two periods cover the span.");

    let selection = TemporalParser.parse_selection(&rendered).unwrap();
    assert_eq!(selection.inferred_timespan, Some(timespan));
    assert_eq!(
        selection.coverage_justification.as_deref(),
        Some("Two periods cover the span.")
    );
    assert_eq!(selection.anchors, expected);
}

#[test]
fn test_fallback_grammar_without_step_marker() {
    let raw = "Here are some ideas:\n\n1. Plant Domestication\n2. Animal Domestication\n- Sedentary Villages\n";
    let parsed = parser::parse(GenerationAxis::Analytical, raw).unwrap();

    let titles: Vec<&str> = parsed.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Plant Domestication", "Animal Domestication", "Sedentary Villages"]
    );
    assert!(parsed.iter().all(|c| c.scope == FALLBACK_SCOPE));
    assert!(parsed.iter().all(|c| c.final_score == 7.0));
}

#[test]
fn test_prose_without_titles_is_parse_error() {
    let raw = "I could not come up with any anchors for this node.";
    let err = parser::parse(GenerationAxis::Analytical, raw).unwrap_err();
    assert_eq!(err.category(), "parse");
    assert_eq!(err.raw_response(), Some(raw));
}

#[test]
fn test_quoted_and_unquoted_scope_agree() {
    let quoted = "### STEP 3: FINAL SELECTION\n\n1. **Bronze Metallurgy**\n   Scope: \"Copper and tin alloying, ~3,300 BCE.\"\n   Causal: 8/10 | Human Impact: 6/10 | Final Score: 7.2\n";
    let unquoted = quoted.replace('"', "");

    let a = parser::parse(GenerationAxis::Analytical, quoted).unwrap();
    let b = parser::parse(GenerationAxis::Analytical, &unquoted).unwrap();
    assert_eq!(a[0].scope, "Copper and tin alloying, ~3,300 BCE.");
    assert_eq!(a[0].scope, b[0].scope);
    assert_eq!(a[0].final_score, 7.2);
}

#[test]
fn test_incomplete_temporal_entries_are_dropped() {
    let raw = r#"{"anchors": [
        {"title": "No Boundaries", "scope": "Missing dates.", "historicalMeaningfulness": 8, "coverageNecessity": 8},
        {"title": "Complete", "scope": "Has everything.", "timeBoundaries": {"start": "1500", "end": "1600"}, "historicalMeaningfulness": 8, "coverageNecessity": 7}
    ]}"#;

    let parsed = parser::parse(GenerationAxis::Temporal, raw).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].title, "Complete");
    assert_eq!(parsed[0].position, 1);
}

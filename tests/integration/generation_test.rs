//! Generation Integration Tests
//!
//! End-to-end "generate children" runs against an in-memory store with a
//! scripted completion provider.

use fractal_history::commands;
use fractal_history::models::settings::{AppConfig, BatchPolicy};
use fractal_history::services::tree::GenerateRequest;
use fractal_history::state::AppState;
use fractal_history_core::{Breadth, GenerationAxis, GenerationStatus};
use fractal_history_llm::LlmError;

use crate::support::{seeded_database, service, ScriptedProvider};

const FOUR_BLOCKS: &str = r#"### STEP 1: CANDIDATE ANCHORS (6-8)

1. **Plant Domestication**
   Type: Process
   Scope: "Cultivation of wild cereals and legumes in the Fertile Crescent."
   Causal Significance: 8/10
   Human Impact: 7/10
   Final Score: 7.6

### STEP 2: RANKING BY FINAL SCORE

1. Plant Domestication (Final Score: 7.6)

### STEP 3: FINAL SELECTION (4 anchors)

I'm selecting 4 anchors because the remaining candidates overlap with these.

1. **Plant Domestication**
   Scope: "Cultivation of wild cereals and legumes in the Fertile Crescent, ~10,000 BCE."
   Why essential: Every later surplus depends on it.
   Causal: 8/10 | Human Impact: 7/10 | Final Score: 7.6

2. **Animal Domestication**
   Scope: "Herding of sheep, goats and cattle, ~9,000 BCE onward."
   Why essential: Traction, milk and disease all follow from it.
   Causal: 8/10 | Human Impact: 7/10 | Final Score: 7.6

3. **Sedentary Villages**
   Scope: "Permanent settlements such as Jericho and Çatalhöyük."
   Why essential: Storage and property begin here.
   Causal: 8/10 | Human Impact: 7/10 | Final Score: 7.6

4. **Irrigation and Surplus**
   Scope: "Canal systems in Mesopotamia and Egypt enabling food surplus."
   Why essential: Surplus pays for specialists and states.
   Causal: 8/10 | Human Impact: 7/10 | Final Score: 7.6

### STEP 4: WHAT WAS CUT AND WHY

- Pottery: folded into Sedentary Villages.
"#;

const THREE_PERIODS: &str = r#"```json
{
  "inferredTimespan": { "start": "~10,000 BCE", "end": "~3,000 BCE" },
  "anchors": [
    {
      "title": "Early Neolithic: 10,000 - 7,000 BCE",
      "scope": "First cultivation and herding in the Fertile Crescent.",
      "timeBoundaries": { "start": "~10,000 BCE", "end": "~7,000 BCE" },
      "historicalMeaningfulness": 9,
      "coverageNecessity": 8,
      "rationale": "Opens the span."
    },
    {
      "title": "Spread of Farming: 7,000 - 5,000 BCE",
      "scope": "Diffusion of agriculture into Europe, the Nile and the Indus.",
      "timeBoundaries": { "start": "~7,000 BCE", "end": "~5,000 BCE" },
      "historicalMeaningfulness": 8,
      "coverageNecessity": 8
    },
    {
      "title": "Chalcolithic Towns: 5,000 - 3,000 BCE",
      "scope": "Copper working, irrigation and the first proto-cities.",
      "timeBoundaries": { "start": "~5,000 BCE", "end": "~3,000 BCE" },
      "historicalMeaningfulness": "7/10",
      "coverageNecessity": 9
    }
  ],
  "coverageJustification": "Three contiguous periods cover the whole span."
}
```"#;

// ============================================================================
// Analytical Axis
// ============================================================================

#[tokio::test]
async fn test_analytical_generation_stores_four_children() {
    let db = seeded_database();
    let provider = ScriptedProvider::replying(FOUR_BLOCKS);
    let service = service(&db, provider.clone(), BatchPolicy::BestEffort);

    let outcome = service
        .generate_children(GenerateRequest::new("G7H2K", GenerationAxis::Analytical))
        .await
        .unwrap();

    assert_eq!(outcome.anchors_generated, 4);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.parent_position_id, "1A-G7H2K");
    assert_eq!(outcome.model, "scripted-model");
    assert_eq!(
        outcome.ancestor_titles,
        vec!["The Story of Everything".to_string()]
    );

    let titles: Vec<&str> = outcome.anchors.iter().map(|a| a.node.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Plant Domestication",
            "Animal Domestication",
            "Sedentary Villages",
            "Irrigation and Surplus"
        ]
    );

    for (index, child) in outcome.anchors.iter().enumerate() {
        assert_eq!(child.node.position, index as u32 + 1);
        assert_eq!(child.node.level, 2);
        assert_eq!(child.node.breadth, Breadth::A);
        assert_eq!(child.node.generation_status, GenerationStatus::Pending);
        assert!(child.node.position_id.starts_with("2A-"));
        assert_eq!(child.node.id.len(), 5);
        assert_eq!(child.final_score, 7.6);
    }

    let stored = db.list_child_nodes("1A-G7H2K", Breadth::A).unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(db.count_anchors().unwrap(), 14);
}

#[tokio::test]
async fn test_analytical_prompt_carries_context() {
    let db = seeded_database();
    let provider = ScriptedProvider::replying(FOUR_BLOCKS);
    let service = service(&db, provider.clone(), BatchPolicy::BestEffort);

    service
        .generate_children(GenerateRequest::new("G7H2K", GenerationAxis::Analytical))
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].system.is_some());

    let forbidden = requests[0]
        .prompt
        .split("### Forbidden Titles")
        .nth(1)
        .unwrap();
    assert!(forbidden.contains("The Story of Everything"));
    assert!(forbidden.contains("Agricultural Revolution"));
}

#[tokio::test]
async fn test_second_run_sees_first_run_as_siblings() {
    let db = seeded_database();
    let provider = ScriptedProvider::replying(FOUR_BLOCKS);
    let service = service(&db, provider.clone(), BatchPolicy::BestEffort);
    let request = GenerateRequest::new("G7H2K", GenerationAxis::Analytical);

    service.generate_children(request.clone()).await.unwrap();
    let second = service.generate_children(request).await.unwrap();

    assert!(provider.last_prompt().contains("- Plant Domestication"));
    assert_eq!(second.sibling_titles.len(), 4);

    let positions: Vec<u32> = second.anchors.iter().map(|a| a.node.position).collect();
    assert_eq!(positions, vec![5, 6, 7, 8]);
    assert_eq!(db.list_child_nodes("1A-G7H2K", Breadth::A).unwrap().len(), 8);
}

#[tokio::test]
async fn test_title_and_scope_overrides_reach_prompt() {
    let db = seeded_database();
    let provider = ScriptedProvider::replying(FOUR_BLOCKS);
    let service = service(&db, provider.clone(), BatchPolicy::BestEffort);

    let request = GenerateRequest {
        title: Some("Neolithic Revolution".to_string()),
        scope: Some("Farming origins across Eurasia.".to_string()),
        ..GenerateRequest::new("1A-G7H2K", GenerationAxis::Analytical)
    };
    service.generate_children(request).await.unwrap();

    let prompt = provider.last_prompt();
    assert!(prompt.contains("Neolithic Revolution"));
    assert!(prompt.contains("Farming origins across Eurasia."));
}

// ============================================================================
// Temporal Axis
// ============================================================================

#[tokio::test]
async fn test_temporal_generation_mirrors_ratings() {
    let db = seeded_database();
    let provider = ScriptedProvider::replying(THREE_PERIODS);
    let service = service(&db, provider, BatchPolicy::BestEffort);

    let outcome = service
        .generate_children(GenerateRequest::new("G7H2K", GenerationAxis::Temporal))
        .await
        .unwrap();

    assert_eq!(outcome.anchors_generated, 3);
    let first = &outcome.anchors[0];
    assert_eq!(first.node.breadth, Breadth::B);
    assert!(first.node.position_id.starts_with("2B-"));
    assert_eq!(first.causal_significance, 9.0);
    assert_eq!(first.human_impact, 8.0);
    assert_eq!(
        first.time_boundaries.as_ref().map(|t| t.end.as_str()),
        Some("~7,000 BCE")
    );

    let third = &outcome.anchors[2];
    assert_eq!(third.causal_significance, 7.0);
    assert_eq!(third.node.position, 3);

    assert!(db.list_child_nodes("1A-G7H2K", Breadth::A).unwrap().is_empty());
    assert_eq!(db.list_child_nodes("1A-G7H2K", Breadth::B).unwrap().len(), 3);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_upstream_failure_writes_nothing() {
    let db = seeded_database();
    let provider = ScriptedProvider::failing(LlmError::NetworkError {
        message: "connection refused".to_string(),
    });
    let service = service(&db, provider, BatchPolicy::BestEffort);

    let err = service
        .generate_children(GenerateRequest::new("G7H2K", GenerationAxis::Analytical))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "upstream");
    assert_eq!(db.count_anchors().unwrap(), 10);
}

#[tokio::test]
async fn test_unparseable_completion_reports_raw_text() {
    let db = seeded_database();
    let raw = "### STEP 3: FINAL SELECTION\n\nNothing survived the cut.\n";
    let provider = ScriptedProvider::replying(raw);
    let service = service(&db, provider, BatchPolicy::BestEffort);

    let err = service
        .generate_children(GenerateRequest::new("G7H2K", GenerationAxis::Analytical))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "parse");
    assert_eq!(err.raw_response(), Some(raw));
    assert_eq!(db.count_anchors().unwrap(), 10);
}

#[tokio::test]
async fn test_unknown_parent_is_not_found() {
    let db = seeded_database();
    let provider = ScriptedProvider::replying(FOUR_BLOCKS);
    let service = service(&db, provider.clone(), BatchPolicy::BestEffort);

    let err = service
        .generate_children(GenerateRequest::new("ZZZZZ", GenerationAxis::Analytical))
        .await
        .unwrap_err();

    assert_eq!(err.category(), "not_found");
    assert!(provider.requests().is_empty());
}

// ============================================================================
// Command Boundary
// ============================================================================

#[tokio::test]
async fn test_generate_command_returns_raw_text_on_parse_failure() {
    let raw = "### STEP 3: FINAL SELECTION\n\nNothing survived the cut.\n";
    let provider = ScriptedProvider::replying(raw);
    let state = AppState::new(seeded_database(), provider, AppConfig::default());

    let response = commands::generate_children(&state, "G7H2K", "A", None, None).await;

    assert!(!response.success);
    assert_eq!(response.error_category.as_deref(), Some("parse"));
    assert_eq!(response.raw_response.as_deref(), Some(raw));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["raw_response"], raw);
}

#[tokio::test]
async fn test_generate_command_success_has_no_raw_error_text() {
    let provider = ScriptedProvider::replying(FOUR_BLOCKS);
    let state = AppState::new(seeded_database(), provider, AppConfig::default());

    let response = commands::generate_children(&state, "G7H2K", "A", None, None).await;

    assert!(response.success);
    assert!(response.raw_response.is_none());
    assert_eq!(response.data.unwrap().anchors_generated, 4);
}

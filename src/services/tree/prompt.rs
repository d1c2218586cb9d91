//! Prompt Builder
//!
//! Renders the instruction document for one generation request. The
//! analytical prompt asks for a four-step text response; the temporal prompt
//! asks for a single JSON object. Both embed the ancestor titles as forbidden
//! output and list the existing siblings on the target axis.
//!
//! The `render_*` functions produce responses in exactly the grammar the
//! prompts request. The prompts use them for their format examples and the
//! parser tests feed them back through the parser.

use serde_json::json;

use fractal_history_core::{
    CandidateAnchor, CandidateDetail, GenerationAxis, GenerationContext, TimeBoundaries,
};

/// System role sent with every generation request
pub const SYSTEM_ROLE: &str = "You are an expert historian using the Fractal History methodology to select the most essential anchors for historical topics.";

/// Render the user prompt for `axis`.
pub fn build_prompt(axis: GenerationAxis, context: &GenerationContext) -> String {
    match axis {
        GenerationAxis::Analytical => build_analytical_prompt(context),
        GenerationAxis::Temporal => build_temporal_prompt(context),
    }
}

fn parent_section(context: &GenerationContext) -> String {
    let scope = if context.parent.scope.trim().is_empty() {
        "No scope provided"
    } else {
        context.parent.scope.as_str()
    };
    format!(
        "**Parent ID:** {}\n**Parent Title:** {}\n**Parent Scope:** {}\n",
        context.parent.position_id, context.parent.title, scope
    )
}

fn ancestry_section(context: &GenerationContext) -> String {
    let mut out = String::from("## Ancestry (root first)\n\n");
    if context.ancestors.is_empty() {
        out.push_str("This parent sits directly at the root of the tree.\n");
    } else {
        for ancestor in &context.ancestors {
            out.push_str(&format!(
                "- Level {} ({}): {}\n",
                ancestor.level, ancestor.breadth, ancestor.title
            ));
        }
    }

    out.push_str("\n### Forbidden Titles\n\n");
    out.push_str(
        "The following titles already appear on this anchor's path. Do NOT use any of them, \
         or a rephrasing of them, as a child title:\n\n",
    );
    for title in context.forbidden_titles() {
        out.push_str(&format!("- {}\n", title));
    }
    out
}

fn siblings_section(context: &GenerationContext, axis_label: &str) -> String {
    let mut out = format!("## Existing {} Children\n\n", axis_label);
    if context.siblings.is_empty() {
        out.push_str("None yet.\n");
    } else {
        out.push_str(
            "These children already exist under this parent. Do NOT propose duplicates of them:\n\n",
        );
        for sibling in &context.siblings {
            out.push_str(&format!("- {}\n", sibling.title));
        }
    }
    out
}

fn analytical_example() -> Vec<CandidateAnchor> {
    vec![
        CandidateAnchor::analytical(
            "Printing Press",
            "The spread of movable-type printing in fifteenth-century Europe. Covers the technology, its diffusion, and its effect on literacy. Excludes earlier East Asian block printing.",
            1,
            9.0,
            8.0,
            8.6,
        ),
        CandidateAnchor::analytical(
            "Protestant Reformation",
            "The religious schism that began in 1517 and reshaped European politics. Covers doctrine, wars of religion, and new churches.",
            2,
            8.0,
            7.0,
            7.6,
        ),
    ]
}

fn build_analytical_prompt(context: &GenerationContext) -> String {
    format!(
        r#"# Breadth-A Anchor Selection Task

## Your Task

You are selecting **Breadth-A anchors** (analytical - most essential aspects) for the parent anchor:

{parent}
Your goal is to identify the 3-5 most causally important and impactful aspects of this topic that users must understand to grasp its essence.

**Critical perspective requirement:** Approach this as if you're an alien historian studying Earth with no cultural bias. Actively resist Western/European-centric defaults.

{ancestry}
{siblings}
---

## What are A-Anchors?

A-anchors represent the **most essential knowledge** about a topic. They answer: "If someone learns nothing else about this topic, what must they understand?"

A-anchors can be events, processes, phenomena, concepts, people, institutions, or technologies.

---

## Selection Criteria: Dual Rating System

For each candidate anchor:

### 1. Causal Significance (1-10)
- How directly did this shape subsequent history?
- How many later developments depend on understanding this?
- Does this represent fundamental transformation vs. incremental change?

### 2. Human Impact (1-10)
- How many people were directly affected?
- How severe was the improvement in well-being or suffering?
- Duration of impact (brief crisis vs. lasting transformation)?

### Final Score Formula
Final Score = (Causal Significance × 0.6) + (Human Impact × 0.4)

**Minimum threshold:** Strong A-anchor candidates should score ≥ 6.0

---

## Critical Rules

### Rule 1: NO Double-Barreled Anchors
Each anchor must be a single, atomic concept.
BAD: "World War One and World War Two"
GOOD: "World War One" (separate from "World War Two")

### Rule 2: Choose 3-5 Anchors (Variable Count)
DO NOT default to always choosing 5. Let the score clustering decide:
- **3 anchors:** Clear three-part structure
- **4 anchors:** Four distinct domains
- **5 anchors:** Complex topic with 5 genuinely essential aspects

### Rule 3: Each Anchor Needs Scope Description
For each anchor, provide 2-3 sentences describing what it covers, its time period, and what is included or excluded.

### Rule 4: No Circular or Duplicate Anchors
Never reuse a forbidden title from the ancestry above, and never duplicate an existing child.

### Rule 5: No Quotation Marks Around Titles
Write titles as plain text inside bold markers. Titles are matched exactly downstream.

---

## Your Output Format

You MUST structure your response EXACTLY as follows:

### STEP 1: CANDIDATE ANCHORS (6-8)

Generate 6-8 candidates. For each:

[Number]. **[Name]**
   Type: [Event/Process/Phenomenon/Concept/Person/Institution/Technology]
   Scope: "[2-3 sentence description]"
   Causal Significance: X/10
   Human Impact: Y/10
   Final Score: [Calculated score]

### STEP 2: RANKING BY FINAL SCORE

1. [Title] (Final Score: X.X)
2. [Title] (Final Score: X.X)
[...]

### STEP 3: FINAL SELECTION (3-5 anchors)

State your choice: "I'm selecting [3/4/5] anchors because [reasoning]."

For each selected anchor:

[Number]. **[Name]**
   Scope: "[2-3 sentences]"
   Why essential: [1-2 sentences]
   Causal: X/10 | Human Impact: Y/10 | Final Score: Z.Z

### STEP 4: WHAT WAS CUT AND WHY

For excluded candidates:
- [Title] (Score: X.X): [Why excluded]

---

## Example of a Correctly Formatted Response (different topic)

{example}
---

Begin with STEP 1: Generate 6-8 candidate anchors for this parent topic."#,
        parent = parent_section(context),
        ancestry = ancestry_section(context),
        siblings = siblings_section(context, "Breadth-A"),
        example = render_analytical_response(&analytical_example()),
    )
}

fn temporal_example() -> (TimeBoundaries, Vec<CandidateAnchor>) {
    let span = |start: &str, end: &str| TimeBoundaries {
        start: start.to_string(),
        end: end.to_string(),
    };
    let anchors = vec![
        CandidateAnchor::temporal(
            "Early Industrialization",
            "Mechanized textile production and steam power in Britain. Covers the first factories and canals.",
            1,
            span("1750", "1830"),
            9.0,
            8.0,
            Some("The break with agrarian production".to_string()),
        ),
        CandidateAnchor::temporal(
            "Railway Age",
            "Rail networks, steel, and the spread of industry to Europe and North America.",
            2,
            span("1830", "1900"),
            8.0,
            9.0,
            Some("Industry becomes continental in scale".to_string()),
        ),
    ];
    (span("1750", "1900"), anchors)
}

fn build_temporal_prompt(context: &GenerationContext) -> String {
    let (timespan, anchors) = temporal_example();
    format!(
        r#"# Breadth-B Anchor Selection Task

## Your Task

You are selecting **Breadth-B anchors** (temporal - chronological periods) for the parent anchor:

{parent}
Partition the parent's timespan into 3-5 contiguous chronological periods. Together the periods must cover the whole timespan with no gaps and no overlaps: each period starts where the previous one ends.

{ancestry}
{siblings}
---

## Rules

### Rule 1: Infer the Timespan
Infer the overall start and end of the parent topic from its title and scope.

### Rule 2: Choose 3-5 Periods (Variable Count)
Pick the number of periods that matches genuine historical turning points. Do not default to 5.

### Rule 3: Explicit Boundaries
Every period carries a start and an end in a unit suited to the scale: "4 BYA", "300,000 years ago", "10,000 BCE", "1945".

### Rule 4: Respect Inherited Constraints
If the ancestry above narrows geography, theme, or time, every period must stay inside those limits.

### Rule 5: Dual Rating
Rate each period 1-10 on:
- **Historical Meaningfulness:** Is this a coherent era with its own character?
- **Coverage Necessity:** Would the timeline have a hole without it?

### Rule 6: Titles
One atomic period name per anchor. No quotation marks inside titles. Never reuse a forbidden title.

---

## Your Output Format

Respond with ONE JSON object and nothing else. No prose before or after it.

{{
  "inferredTimespan": {{ "start": "...", "end": "..." }},
  "anchors": [
    {{
      "title": "...",
      "timeBoundaries": {{ "start": "...", "end": "..." }},
      "scope": "2-3 sentences",
      "historicalMeaningfulness": 1-10,
      "coverageNecessity": 1-10,
      "rationale": "..."
    }}
  ],
  "coverageJustification": "..."
}}

## Example of a Correctly Formatted Response (different topic)

{example}
"#,
        parent = parent_section(context),
        ancestry = ancestry_section(context),
        siblings = siblings_section(context, "Breadth-B"),
        example = render_temporal_response(
            &timespan,
            &anchors,
            "Two periods split at the arrival of the railway cover the whole span."
        ),
    )
}

/// Render candidates as a four-step analytical response.
pub fn render_analytical_response(candidates: &[CandidateAnchor]) -> String {
    let mut out = String::from("### STEP 1: CANDIDATE ANCHORS (6-8)\n\n");
    for (index, c) in candidates.iter().enumerate() {
        out.push_str(&format!(
            "{}. **{}**\n   Type: Process\n   Scope: \"{}\"\n   Causal Significance: {}/10\n   Human Impact: {}/10\n   Final Score: {}\n\n",
            index + 1,
            c.title,
            c.scope,
            c.causal_significance,
            c.human_impact,
            c.final_score
        ));
    }

    out.push_str("### STEP 2: RANKING BY FINAL SCORE\n\n");
    for (index, c) in candidates.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} (Final Score: {})\n",
            index + 1,
            c.title,
            c.final_score
        ));
    }

    out.push_str(&format!(
        "\n### STEP 3: FINAL SELECTION ({} anchors)\n\nI'm selecting {} anchors because their scores cluster clearly above the rest.\n\n",
        candidates.len(),
        candidates.len()
    ));
    for (index, c) in candidates.iter().enumerate() {
        let why = match &c.detail {
            CandidateDetail::Analytical {
                why_essential: Some(why),
            } => why.as_str(),
            _ => "Later developments depend on it.",
        };
        out.push_str(&format!(
            "{}. **{}**\n   Scope: \"{}\"\n   Why essential: {}\n   Causal: {}/10 | Human Impact: {}/10 | Final Score: {}\n\n",
            index + 1,
            c.title,
            c.scope,
            why,
            c.causal_significance,
            c.human_impact,
            c.final_score
        ));
    }

    out.push_str("### STEP 4: WHAT WAS CUT AND WHY\n\n- None: every candidate was selected.\n");
    out
}

/// Render temporal candidates as the JSON object the temporal prompt asks for.
pub fn render_temporal_response(
    timespan: &TimeBoundaries,
    candidates: &[CandidateAnchor],
    coverage_justification: &str,
) -> String {
    let anchors: Vec<serde_json::Value> = candidates
        .iter()
        .map(|c| {
            let mut entry = json!({
                "title": c.title,
                "scope": c.scope,
                "historicalMeaningfulness": c.causal_significance,
                "coverageNecessity": c.human_impact,
            });
            if let CandidateDetail::Temporal {
                time_boundaries,
                rationale,
                ..
            } = &c.detail
            {
                entry["timeBoundaries"] = json!({
                    "start": time_boundaries.start,
                    "end": time_boundaries.end,
                });
                if let Some(rationale) = rationale {
                    entry["rationale"] = json!(rationale);
                }
            }
            entry
        })
        .collect();

    let document = json!({
        "inferredTimespan": { "start": timespan.start, "end": timespan.end },
        "anchors": anchors,
        "coverageJustification": coverage_justification,
    });
    serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string())
}

//! Generation Service
//!
//! Runs one "generate children" request end to end: context assembly, prompt
//! build, one completion call, parse, write. The steps run strictly in
//! sequence; nothing is retried internally.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use fractal_history_core::{GenerationAxis, GenerationStatus};
use fractal_history_llm::{LlmError, LlmProvider, LlmRequestOptions, LlmResponse, Message};

use crate::models::anchor::GenerationOutcome;
use crate::models::settings::BatchPolicy;
use crate::services::tree::context::ContextAssembler;
use crate::services::tree::parser;
use crate::services::tree::prompt::{build_prompt, SYSTEM_ROLE};
use crate::services::tree::writer::TreeWriter;
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};

/// A request to generate children for one parent along one axis
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Anchor id or position id of the parent
    pub parent_id: String,
    pub axis: GenerationAxis,
    /// Overrides the stored parent title in the prompt
    pub title: Option<String>,
    /// Overrides the stored parent scope in the prompt
    pub scope: Option<String>,
}

impl GenerateRequest {
    pub fn new(parent_id: impl Into<String>, axis: GenerationAxis) -> Self {
        Self {
            parent_id: parent_id.into(),
            axis,
            title: None,
            scope: None,
        }
    }
}

/// Generates and stores children with a completion provider
pub struct GenerationService {
    db: Database,
    provider: Arc<dyn LlmProvider>,
    policy: BatchPolicy,
}

impl GenerationService {
    pub fn new(db: Database, provider: Arc<dyn LlmProvider>, policy: BatchPolicy) -> Self {
        Self {
            db,
            provider,
            policy,
        }
    }

    /// Generate children for `request.parent_id` and store them.
    pub async fn generate_children(&self, request: GenerateRequest) -> AppResult<GenerationOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "generate_children",
            request_id = %request_id,
            parent_id = %request.parent_id,
            axis = %request.axis,
        );
        self.run(request, request_id).instrument(span).await
    }

    async fn run(&self, request: GenerateRequest, request_id: String) -> AppResult<GenerationOutcome> {
        let parent_id = request.parent_id.trim();
        if parent_id.is_empty() {
            return Err(AppError::validation("parent_id is required"));
        }
        let axis = request.axis;

        let context = ContextAssembler::new(&self.db).assemble(
            parent_id,
            axis,
            request.title.as_deref(),
            request.scope.as_deref(),
        )?;
        let prompt = build_prompt(axis, &context);
        debug!(
            ancestors = context.ancestors.len(),
            siblings = context.siblings.len(),
            len = prompt.len(),
            "generator: prompt built"
        );

        let started = Instant::now();
        let response = self
            .provider
            .send_message(
                vec![Message::user(prompt)],
                Some(SYSTEM_ROLE.to_string()),
                LlmRequestOptions::default(),
            )
            .await?;
        info!(
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generator: completion received"
        );
        if response.is_truncated() {
            warn!("generator: completion hit the token limit, parsing what arrived");
        }

        let raw = extract_response_text(&response)?;
        let candidates = parser::parse(axis, &raw)?;

        let report = TreeWriter::new(&self.db, self.policy).write_children(
            &context.parent.anchor_id,
            axis,
            &context.parent.position_id,
            &candidates,
            GenerationStatus::Pending,
        )?;

        info!(
            parsed = candidates.len(),
            inserted = report.inserted.len(),
            failed = report.failures.len(),
            "generator: children generated"
        );

        Ok(GenerationOutcome {
            request_id,
            parent_id: context.parent.anchor_id.clone(),
            parent_position_id: context.parent.position_id.clone(),
            axis,
            anchors_generated: report.inserted.len(),
            anchors: report.inserted,
            failures: report.failures,
            ancestor_titles: context.ancestor_titles(),
            sibling_titles: context.sibling_titles(),
            raw_response: raw,
            model: response.model,
        })
    }
}

/// The completion text, or an upstream error when the provider returned none.
fn extract_response_text(response: &LlmResponse) -> AppResult<String> {
    match response.content.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(AppError::Upstream(LlmError::ParseError {
            message: format!(
                "Completion contained no text content (model: {}, stop_reason: {:?})",
                response.model, response.stop_reason
            ),
        })),
    }
}

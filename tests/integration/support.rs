//! Shared test fixtures: a scripted completion provider and a seeded store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fractal_history::models::settings::BatchPolicy;
use fractal_history::services::tree::{seed_tree, GenerationService};
use fractal_history::storage::Database;
use fractal_history_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};

/// What the scripted provider answers with
pub enum Script {
    Text(String),
    Failure(LlmError),
}

/// A request the provider saw
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub prompt: String,
    pub system: Option<String>,
}

/// Provider that replays a fixed answer and records every request
pub struct ScriptedProvider {
    config: ProviderConfig,
    script: Mutex<Script>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Self::with_script(Script::Text(text.into()))
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Self::with_script(Script::Failure(error))
    }

    fn with_script(script: Script) -> Arc<Self> {
        Arc::new(Self {
            config: ProviderConfig {
                api_key: Some("sk-test".to_string()),
                model: "scripted-model".to_string(),
                ..Default::default()
            },
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.requests()
            .last()
            .map(|r| r.prompt.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { prompt, system });

        match &*self.script.lock().unwrap() {
            Script::Text(text) => Ok(LlmResponse::text(text.clone(), self.config.model.clone())),
            Script::Failure(error) => Err(error.clone()),
        }
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// An in-memory store with the root and first-level anchors loaded
pub fn seeded_database() -> Database {
    let db = Database::new_in_memory().unwrap();
    seed_tree(&db).unwrap();
    db
}

pub fn service(db: &Database, provider: Arc<ScriptedProvider>, policy: BatchPolicy) -> GenerationService {
    GenerationService::new(db.clone(), provider, policy)
}

//! Application State
//!
//! The services every command needs, constructed once by the composition
//! root and passed in explicitly.

use std::path::Path;
use std::sync::Arc;

use fractal_history_llm::{LlmProvider, OpenAIProvider};

use crate::models::settings::AppConfig;
use crate::services::tree::GenerationService;
use crate::storage::Database;
use crate::utils::error::AppResult;

/// Shared application state
pub struct AppState {
    /// SQLite tree store with connection pool
    database: Database,
    /// Completion provider used by generation
    provider: Arc<dyn LlmProvider>,
    /// Configuration the state was built from
    config: AppConfig,
}

impl AppState {
    /// Create state from already-constructed services
    pub fn new(database: Database, provider: Arc<dyn LlmProvider>, config: AppConfig) -> Self {
        Self {
            database,
            provider,
            config,
        }
    }

    /// Open the database and build the provider described by `config`.
    ///
    /// `database_path` overrides both the config value and the default location.
    pub fn from_config(config: AppConfig, database_path: Option<&Path>) -> AppResult<Self> {
        let database = match database_path.or(config.database_path.as_deref()) {
            Some(path) => Database::open(path)?,
            None => Database::new()?,
        };
        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAIProvider::new(config.provider_config())?);
        Ok(Self::new(database, provider, config))
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A generation service sharing this state's database and provider
    pub fn generation_service(&self) -> GenerationService {
        GenerationService::new(
            self.database.clone(),
            Arc::clone(&self.provider),
            self.config.batch_policy,
        )
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        self.database.is_healthy()
    }

    /// Whether the provider has an API key to send
    pub fn is_provider_configured(&self) -> bool {
        self.provider.config().api_key.is_some()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("batch_policy", &self.config.batch_policy)
            .finish()
    }
}

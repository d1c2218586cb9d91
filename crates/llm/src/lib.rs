//! Fractal History LLM
//!
//! The completion-service boundary of the tree engine: a text-in/text-out
//! `LlmProvider` trait and an OpenAI-compatible chat-completions provider
//! (OpenAI, DeepSeek, or any endpoint speaking the same wire format via a
//! base URL override).

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;

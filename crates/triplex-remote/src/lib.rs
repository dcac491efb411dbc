//! Triplex Remote - HTTP collaborators of the extraction core
//!
//! - `llm`: generative-text clients (Gemini, OpenAI-compatible, Ollama)
//!   implementing `triplex_core::LlmClient`
//! - `article`: Wikipedia plain-text source implementing
//!   `triplex_core::ArticleSource`
//!
//! Calls are single-shot with a configurable timeout and no retry.

pub mod article;
pub mod llm;

pub use article::WikipediaClient;
pub use llm::{create_llm_client, GeminiClient, OllamaClient, OpenAiClient};

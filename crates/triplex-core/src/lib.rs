//! Triplex Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Triplex:
//! - Annotated documents (token arena with dependency edges)
//! - Relation records, the output shared by every extractor
//! - Common error types
//! - Shared traits for the generative-text service and article source
//! - Configuration management

pub mod config;
pub mod document;

pub use config::{
    AppConfig, ArticleConfig, ConfigError, EvaluationConfig, ExtractionConfig, LlmConfig,
    LlmProvider, LoggingConfig,
};
pub use document::{DepLabel, Document, DocumentBuilder, PartOfSpeech, Token, TokenId};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Triplex operations
#[derive(Error, Debug)]
pub enum TriplexError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Article source error: {0}")]
    ArticleError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TriplexError>;

impl From<ConfigError> for TriplexError {
    fn from(e: ConfigError) -> Self {
        Self::ConfigError(e.to_string())
    }
}

// ============================================================================
// Relation Records
// ============================================================================

/// A (subject, relation, object) triplet
///
/// Records have no identity beyond their field values, so two extractors
/// producing the same triplet produce equal records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationRecord {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl RelationRecord {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for RelationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.relation, self.object)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for generative-text clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a reply for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Trait for article sources (lookup by title, plain text out)
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, title: &str) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_rendering() {
        let record = RelationRecord::new("John F. Kennedy", "married to", "Jacqueline Bouvier");
        assert_eq!(
            record.to_string(),
            "(John F. Kennedy, married to, Jacqueline Bouvier)"
        );
    }

    #[test]
    fn test_record_value_equality() {
        let a = RelationRecord::new("Dan", "likes", "David");
        let b = RelationRecord::new("Dan".to_string(), "likes", "David");
        assert_eq!(a, b);
        assert_ne!(a, RelationRecord::new("David", "likes", "Dan"));
    }

    #[test]
    fn test_record_json_shape() {
        let record = RelationRecord::new("Dan", "likes", "David");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["subject"], "Dan");
        assert_eq!(json["relation"], "likes");
        assert_eq!(json["object"], "David");
    }

    #[test]
    fn test_error_display() {
        let err = TriplexError::NotFound("Bradley Pitt".to_string());
        assert_eq!(err.to_string(), "Not found: Bradley Pitt");
    }
}

//! Triplex Extractor - Relation extraction strategies
//!
//! Three interchangeable strategies turn an annotated document into
//! (subject, relation, object) records anchored on proper nouns:
//! - `structural`: subject/object templates on the dependency tree
//! - `pattern`: a linear scan for name / verb / name windows
//! - `llm`: a generative model prompted to list the triplets
//!
//! All of them implement [`RelationExtractor`], so callers such as the
//! evaluation harness can hold them as `Box<dyn RelationExtractor>`.

use async_trait::async_trait;

use triplex_core::{Document, RelationRecord, Result};

pub mod compound;
pub mod evaluation;
pub mod llm;
pub mod pattern;
pub mod structural;

pub use compound::CompoundEntity;
pub use evaluation::{Evaluation, ExtractorReport};
pub use llm::LlmExtractor;
pub use pattern::PatternExtractor;
pub use structural::StructuralExtractor;

/// Trait for relation extractors
///
/// The document is borrowed read-only; implementations never modify it.
#[async_trait]
pub trait RelationExtractor: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    async fn extract(&self, document: &Document) -> Result<Vec<RelationRecord>>;
}

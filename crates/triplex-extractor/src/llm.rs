//! LLM-backed relation extraction
//!
//! The document text is appended to a fixed instruction and sent to a
//! generative model. The reply is read line by line; each line of the form
//! `[Subject, Relation, Object]` becomes a record and anything else is
//! dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use triplex_core::{
    Document, ExtractionConfig, LlmClient, RelationRecord, Result, TriplexError,
};

use crate::RelationExtractor;

/// LLM-based relation extractor
pub struct LlmExtractor {
    client: Arc<dyn LlmClient>,
    config: ExtractionConfig,
}

impl LlmExtractor {
    /// Create with the default prompt and separator
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            config: ExtractionConfig::default(),
        }
    }

    /// Create with a custom prompt contract
    pub fn with_config(client: Arc<dyn LlmClient>, config: ExtractionConfig) -> Result<Self> {
        if config.separator.is_empty() {
            return Err(TriplexError::ValidationError(
                "extraction separator must not be empty".to_string(),
            ));
        }
        Ok(Self { client, config })
    }

    /// Build the extraction prompt
    pub fn build_prompt(&self, text: &str) -> String {
        format!("{}{}", self.config.prompt_prefix, text)
    }

    /// Parse a model reply into records
    pub fn parse_response(&self, response: &str) -> Vec<RelationRecord> {
        parse_reply(response, &self.config.separator)
    }

    /// Extract from raw text, without an annotated document
    pub async fn extract_text(&self, text: &str) -> Result<Vec<RelationRecord>> {
        let prompt = self.build_prompt(text);
        let response = self.client.generate(&prompt).await?;
        let records = self.parse_response(&response);

        debug!(
            provider = self.client.name(),
            reply_lines = response.lines().count(),
            records = records.len(),
            "llm extraction finished"
        );
        Ok(records)
    }
}

#[async_trait]
impl RelationExtractor for LlmExtractor {
    fn name(&self) -> &str {
        "llm"
    }

    async fn extract(&self, document: &Document) -> Result<Vec<RelationRecord>> {
        if document.is_empty() {
            return Ok(Vec::new());
        }
        self.extract_text(&document.text()).await
    }
}

/// Parse every non-empty line of a reply, dropping malformed ones
pub fn parse_reply(reply: &str, separator: &str) -> Vec<RelationRecord> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let record = parse_line(line, separator);
            if record.is_none() {
                debug!(line, "dropping malformed reply line");
            }
            record
        })
        .collect()
}

/// Parse one `[Subject SEP Relation SEP Object]` line
pub fn parse_line(line: &str, separator: &str) -> Option<RelationRecord> {
    let line = line.trim();
    let inner = line.strip_prefix('[').unwrap_or(line);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    match inner.split(separator).collect::<Vec<_>>().as_slice() {
        [subject, relation, object] => Some(RelationRecord::new(
            subject.trim(),
            relation.trim(),
            object.trim(),
        )),
        _ => None,
    }
}

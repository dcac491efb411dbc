//! Token-pattern relation extraction
//!
//! A single left-to-right scan over the token stream pairs each proper noun
//! with the next one when a verb occurs between them. The relation is built
//! from the verbs and adpositions in between.
//!
//! Runs of consecutive proper nouns are first merged into one token, so
//! "Brad Pitt" anchors a window as a single name. Merging produces a new
//! [`MergedToken`] stream and never touches the source document.

use std::ops::Range;

use async_trait::async_trait;
use tracing::debug;

use triplex_core::{Document, PartOfSpeech, RelationRecord, Result, Token};

use crate::RelationExtractor;

/// A token of the merged view; `span` covers the source positions it replaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedToken {
    pub text: String,
    pub pos: PartOfSpeech,
    pub space_after: bool,
    pub span: Range<usize>,
}

impl From<&Token> for MergedToken {
    fn from(token: &Token) -> Self {
        let start = token.id.index();
        Self {
            text: token.text.clone(),
            pos: token.pos,
            space_after: token.space_after,
            span: start..start + 1,
        }
    }
}

/// Collapse every maximal run of adjacent proper nouns into one token.
///
/// Merged runs are never adjacent to each other, so applying this to its
/// own output returns the input unchanged.
pub fn merge_proper_noun_spans(tokens: &[MergedToken]) -> Vec<MergedToken> {
    let mut merged: Vec<MergedToken> = Vec::with_capacity(tokens.len());

    for token in tokens {
        match merged.last_mut() {
            Some(last)
                if last.pos == PartOfSpeech::ProperNoun
                    && token.pos == PartOfSpeech::ProperNoun =>
            {
                if last.space_after {
                    last.text.push(' ');
                }
                last.text.push_str(&token.text);
                last.space_after = token.space_after;
                last.span.end = token.span.end;
            }
            _ => merged.push(token.clone()),
        }
    }

    merged
}

/// Merged view of a whole document
pub fn merged_view(document: &Document) -> Vec<MergedToken> {
    let tokens: Vec<MergedToken> = document.tokens().iter().map(MergedToken::from).collect();
    merge_proper_noun_spans(&tokens)
}

/// Scan the merged stream and return every finished candidate window.
///
/// Each window starts and ends with a proper noun and holds at least one
/// verb. Punctuation drops the open window; a window still open at the end
/// of the stream is dropped.
pub fn candidate_windows(tokens: &[MergedToken]) -> Vec<Vec<&MergedToken>> {
    let mut candidates = Vec::new();
    let mut window: Option<Vec<&MergedToken>> = None;

    for token in tokens {
        match token.pos {
            PartOfSpeech::ProperNoun => {
                if let Some(mut open) = window.take() {
                    if open.iter().any(|t| t.pos == PartOfSpeech::Verb) {
                        open.push(token);
                        candidates.push(open);
                    }
                }
                window = Some(vec![token]);
            }
            PartOfSpeech::Punctuation => window = None,
            _ => {
                if let Some(open) = window.as_mut() {
                    open.push(token);
                }
            }
        }
    }

    candidates
}

/// Turn a finished window into a record; `None` when it has no verb or adposition
pub fn window_to_record(window: &[&MergedToken]) -> Option<RelationRecord> {
    let (subject, object) = match window {
        [first, .., last] => (first, last),
        _ => return None,
    };

    let relation = window
        .iter()
        .filter(|t| matches!(t.pos, PartOfSpeech::Verb | PartOfSpeech::Adposition))
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if relation.is_empty() {
        return None;
    }

    Some(RelationRecord::new(
        subject.text.clone(),
        relation,
        object.text.clone(),
    ))
}

/// Merge, scan and build records for a whole document
pub fn extract_relations(document: &Document) -> Vec<RelationRecord> {
    let tokens = merged_view(document);
    let windows = candidate_windows(&tokens);
    let records: Vec<RelationRecord> = windows
        .iter()
        .filter_map(|w| window_to_record(w))
        .collect();

    debug!(
        tokens = document.len(),
        merged = tokens.len(),
        windows = windows.len(),
        records = records.len(),
        "pattern extraction finished"
    );
    records
}

/// Extractor scanning for proper noun / verb / proper noun patterns
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RelationExtractor for PatternExtractor {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn extract(&self, document: &Document) -> Result<Vec<RelationRecord>> {
        Ok(extract_relations(document))
    }
}

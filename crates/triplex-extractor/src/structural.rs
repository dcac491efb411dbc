//! Dependency-template relation extraction
//!
//! Every ordered pair of proper-noun heads (h1, h2) is tested against two
//! templates on the dependency tree:
//!
//! - subject-verb-object: h1 and h2 share a head h, `(h, h1)` is `nsubj`
//!   and `(h, h2)` is `dobj`. The relation is h.
//! - subject-preposition-object: h1's head h is the head of h2's head h',
//!   `(h, h1)` is `nsubj`, `(h, h')` is `prep` and `(h', h2)` is `pobj`.
//!   The relation is "h h'", e.g. "married to".
//!
//! Both directions of a pair are tested and nothing is deduplicated.

use async_trait::async_trait;
use tracing::debug;

use triplex_core::{DepLabel, Document, RelationRecord, Result, Token};

use crate::compound::{self, CompoundEntity};
use crate::RelationExtractor;

/// Extractor matching subject/object templates on the dependency tree
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralExtractor;

impl StructuralExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RelationExtractor for StructuralExtractor {
    fn name(&self) -> &str {
        "structural"
    }

    async fn extract(&self, document: &Document) -> Result<Vec<RelationRecord>> {
        Ok(extract_relations(document))
    }
}

/// Run both templates over every ordered pair of compound proper nouns
pub fn extract_relations(document: &Document) -> Vec<RelationRecord> {
    let entities = compound::group(document);
    let mut records = Vec::new();

    for e1 in &entities {
        for e2 in &entities {
            if let Some(relation) = match_templates(document, e1.head(), e2.head()) {
                records.push(relation_record(e1, relation, e2));
            }
        }
    }

    debug!(
        entities = entities.len(),
        records = records.len(),
        "structural extraction finished"
    );
    records
}

/// Relation label for (h1, h2), if either template holds
fn match_templates(document: &Document, h1: &Token, h2: &Token) -> Option<String> {
    if h1.dep != DepLabel::NominalSubject {
        return None;
    }
    let h = document.head_of(h1);

    // subject-verb-object
    if h1.head == h2.head && h2.dep == DepLabel::DirectObject {
        return Some(h.text.clone());
    }

    // subject-preposition-object
    let h_prime = document.head_of(h2);
    if h1.head == h_prime.head
        && h_prime.dep == DepLabel::Preposition
        && h2.dep == DepLabel::PrepositionalObject
    {
        return Some(format!("{} {}", h.text, h_prime.text));
    }

    None
}

fn relation_record(
    subject: &CompoundEntity<'_>,
    relation: String,
    object: &CompoundEntity<'_>,
) -> RelationRecord {
    RelationRecord::new(subject.render(), relation, object.render())
}

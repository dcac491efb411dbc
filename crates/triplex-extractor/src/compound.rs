//! Compound proper nouns
//!
//! Groups each proper-noun head with the tokens attached to it by a
//! `compound` edge, so "John F. Kennedy" is handled as one entity.

use triplex_core::{DepLabel, Document, PartOfSpeech, Token};

/// A proper-noun head plus its compound modifiers
#[derive(Debug, Clone)]
pub struct CompoundEntity<'a> {
    head: &'a Token,
    modifiers: Vec<&'a Token>,
}

impl<'a> CompoundEntity<'a> {
    pub fn new(head: &'a Token, modifiers: Vec<&'a Token>) -> Self {
        Self { head, modifiers }
    }

    pub fn head(&self) -> &'a Token {
        self.head
    }

    pub fn modifiers(&self) -> &[&'a Token] {
        &self.modifiers
    }

    /// Member texts in document order, whatever order modifiers were attached in
    pub fn render(&self) -> String {
        let mut members: Vec<&Token> = self.modifiers.clone();
        members.push(self.head);
        members.sort_by_key(|t| t.id);
        members.dedup_by_key(|t| t.id);

        members
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for CompoundEntity<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Whether `token` heads a proper noun rather than modifying another one
pub fn is_proper_noun_head(token: &Token) -> bool {
    token.pos == PartOfSpeech::ProperNoun && token.dep != DepLabel::Compound
}

/// Collect every compound proper noun in the document, in head order.
///
/// Only direct `compound` children are gathered; grandchildren are not
/// followed.
pub fn group(document: &Document) -> Vec<CompoundEntity<'_>> {
    document
        .tokens()
        .iter()
        .filter(|t| is_proper_noun_head(t))
        .map(|head| {
            let modifiers = document
                .children(head.id)
                .filter(|child| child.dep == DepLabel::Compound)
                .collect();
            CompoundEntity::new(head, modifiers)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use triplex_core::{DocumentBuilder, TokenId};

    fn kennedy() -> Document {
        // "John F. Kennedy spoke ."
        let mut b = DocumentBuilder::new();
        b.push("John", PartOfSpeech::ProperNoun, DepLabel::Compound, 2);
        b.push("F.", PartOfSpeech::ProperNoun, DepLabel::Compound, 2);
        b.push("Kennedy", PartOfSpeech::ProperNoun, DepLabel::NominalSubject, 3);
        b.push("spoke", PartOfSpeech::Verb, DepLabel::Other, 3);
        b.push(".", PartOfSpeech::Punctuation, DepLabel::Other, 3);
        b.build().unwrap()
    }

    #[test]
    fn test_groups_compound_modifiers() {
        let doc = kennedy();
        let entities = group(&doc);

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].head().text, "Kennedy");
        assert_eq!(entities[0].modifiers().len(), 2);
        assert_eq!(entities[0].render(), "John F. Kennedy");
    }

    #[test]
    fn test_render_ignores_attachment_order() {
        let doc = kennedy();
        let head = doc.token(TokenId(2));
        let reversed =
            CompoundEntity::new(head, vec![doc.token(TokenId(1)), doc.token(TokenId(0))]);
        assert_eq!(reversed.to_string(), "John F. Kennedy");
    }

    #[test]
    fn test_modifier_after_head_renders_in_position() {
        // "Kennedy Center": head first, compound modifier after
        let mut b = DocumentBuilder::new();
        b.push("Kennedy", PartOfSpeech::ProperNoun, DepLabel::Other, 0);
        b.push("Jr.", PartOfSpeech::ProperNoun, DepLabel::Compound, 0);
        let doc = b.build().unwrap();

        let entities = group(&doc);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].render(), "Kennedy Jr.");
    }

    #[test]
    fn test_only_direct_compound_children() {
        // "New" -> "York" -> "City"; "New" is a grandchild of "City"
        let mut b = DocumentBuilder::new();
        b.push("New", PartOfSpeech::ProperNoun, DepLabel::Compound, 1);
        b.push("York", PartOfSpeech::ProperNoun, DepLabel::Compound, 2);
        b.push("City", PartOfSpeech::ProperNoun, DepLabel::Other, 2);
        let doc = b.build().unwrap();

        let entities = group(&doc);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].render(), "York City");
    }

    #[test]
    fn test_non_compound_children_are_excluded() {
        let mut b = DocumentBuilder::new();
        b.push("the", PartOfSpeech::Other, DepLabel::Other, 1);
        b.push("Beatles", PartOfSpeech::ProperNoun, DepLabel::Other, 1);
        let doc = b.build().unwrap();

        assert_eq!(group(&doc)[0].render(), "Beatles");
    }

    #[test]
    fn test_empty_document() {
        assert!(group(&Document::default()).is_empty());
    }
}

//! spaCy JSON document loader
//!
//! Accepts the output of spaCy's `Doc.to_json()`. Token text is sliced from
//! the document text by character offsets, and `head` is already a
//! document-level token index.

use serde::Deserialize;

use triplex_core::{DepLabel, Document, PartOfSpeech, Token, TokenId};

use crate::{DocumentFormat, DocumentLoader, ParserError, Result};

#[derive(Debug, Deserialize)]
struct SpacyDoc {
    text: String,
    #[serde(default)]
    tokens: Vec<SpacyToken>,
}

#[derive(Debug, Deserialize)]
struct SpacyToken {
    id: usize,
    start: usize,
    end: usize,
    #[serde(default)]
    pos: String,
    #[serde(default)]
    dep: String,
    head: usize,
}

/// spaCy `Doc.to_json()` loader
pub struct SpacyJsonLoader;

impl DocumentLoader for SpacyJsonLoader {
    fn load_str(&self, content: &str) -> Result<Document> {
        let doc: SpacyDoc = serde_json::from_str(content)?;

        // spaCy offsets count characters, not bytes
        let byte_offsets: Vec<usize> = doc
            .text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(doc.text.len()))
            .collect();
        let to_byte = |offset: usize| -> Result<usize> {
            byte_offsets.get(offset).copied().ok_or_else(|| {
                ParserError::InvalidStructure(format!(
                    "offset {offset} is past the end of the text"
                ))
            })
        };

        let mut tokens = Vec::with_capacity(doc.tokens.len());
        for (i, raw) in doc.tokens.iter().enumerate() {
            if raw.start > raw.end {
                return Err(ParserError::InvalidStructure(format!(
                    "token {} has start {} after end {}",
                    raw.id, raw.start, raw.end
                )));
            }
            let text = &doc.text[to_byte(raw.start)?..to_byte(raw.end)?];
            let space_after = match doc.tokens.get(i + 1) {
                Some(next) => next.start > raw.end,
                None => true,
            };

            tokens.push(Token {
                id: TokenId(raw.id),
                text: text.to_string(),
                pos: PartOfSpeech::from_tag(&raw.pos),
                dep: DepLabel::from_label(&raw.dep),
                head: TokenId(raw.head),
                space_after,
            });
        }

        Ok(Document::from_tokens(tokens)?)
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::SpacyJson]
    }
}

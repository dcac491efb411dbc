//! Annotated Document model
//!
//! A document is an arena of tokens. Dependency edges are stored as
//! `TokenId` references into the same arena, so the tree (with its
//! back-pointers to heads) never needs owned recursion.

use serde::{Deserialize, Serialize};

use crate::{Result, TriplexError};

/// Position of a token within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub usize);

impl TokenId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse part-of-speech tag
///
/// Only the tags the extractors branch on are distinguished; every
/// other universal tag collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    ProperNoun,
    Verb,
    Adposition,
    Punctuation,
    Other,
}

impl PartOfSpeech {
    /// Map a Universal Dependencies tag (`PROPN`, `VERB`, ...)
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_uppercase().as_str() {
            "PROPN" => Self::ProperNoun,
            "VERB" => Self::Verb,
            "ADP" => Self::Adposition,
            "PUNCT" => Self::Punctuation,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProperNoun => "PROPN",
            Self::Verb => "VERB",
            Self::Adposition => "ADP",
            Self::Punctuation => "PUNCT",
            Self::Other => "X",
        }
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label on the edge from a token to its syntactic head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepLabel {
    NominalSubject,
    DirectObject,
    Preposition,
    PrepositionalObject,
    Compound,
    Other,
}

impl DepLabel {
    /// Map a dependency label as produced by spaCy or a UD parser.
    ///
    /// UD's `obj` is the same edge as ClearNLP's `dobj`. Subtyped labels
    /// such as `compound:prt` are not compounds of a name.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "nsubj" => Self::NominalSubject,
            "dobj" | "obj" => Self::DirectObject,
            "prep" => Self::Preposition,
            "pobj" => Self::PrepositionalObject,
            "compound" => Self::Compound,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NominalSubject => "nsubj",
            Self::DirectObject => "dobj",
            Self::Preposition => "prep",
            Self::PrepositionalObject => "pobj",
            Self::Compound => "compound",
            Self::Other => "dep",
        }
    }
}

impl std::fmt::Display for DepLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single annotated token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position in the document
    pub id: TokenId,

    /// Surface text
    pub text: String,

    /// Part-of-speech tag
    pub pos: PartOfSpeech,

    /// Label of the edge to `head`
    pub dep: DepLabel,

    /// Syntactic head; a sentence root is its own head
    pub head: TokenId,

    /// Whether whitespace follows this token in the source text
    pub space_after: bool,
}

impl Token {
    pub fn is_root(&self) -> bool {
        self.head == self.id
    }
}

/// Tokenized, tagged and dependency-parsed text
///
/// Constructed through [`Document::from_tokens`] or [`DocumentBuilder`],
/// both of which guarantee that ids are dense and every head exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<Token>,
}

impl Document {
    /// Build a document, validating positions and head references
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Self> {
        for (i, token) in tokens.iter().enumerate() {
            if token.id.index() != i {
                return Err(TriplexError::ValidationError(format!(
                    "token '{}' has position {} but is stored at {}",
                    token.text, token.id, i
                )));
            }
            if token.head.index() >= tokens.len() {
                return Err(TriplexError::ValidationError(format!(
                    "token '{}' at {} points to missing head {}",
                    token.text, token.id, token.head
                )));
            }
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.index())
    }

    /// Token by id; ids taken from this document are always in range
    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    /// The head of `token`
    pub fn head_of(&self, token: &Token) -> &Token {
        self.token(token.head)
    }

    /// Direct dependents of `id`, in document order. A root is not its own child.
    pub fn children(&self, id: TokenId) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .filter(move |t| t.head == id && t.id != id)
    }

    /// Reconstruct the plain text the document was annotated from
    pub fn text(&self) -> String {
        let mut text = String::new();
        for token in &self.tokens {
            text.push_str(&token.text);
            if token.space_after {
                text.push(' ');
            }
        }
        text.truncate(text.trim_end().len());
        text
    }
}

/// Incremental builder, mostly used by loaders and tests
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    tokens: Vec<Token>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token whose head is the token at position `head`
    pub fn push(
        &mut self,
        text: impl Into<String>,
        pos: PartOfSpeech,
        dep: DepLabel,
        head: usize,
    ) -> TokenId {
        let id = TokenId(self.tokens.len());
        self.tokens.push(Token {
            id,
            text: text.into(),
            pos,
            dep,
            head: TokenId(head),
            space_after: true,
        });
        id
    }

    /// Mark the most recently pushed token as glued to the next one
    pub fn no_space_after(&mut self) -> &mut Self {
        if let Some(last) = self.tokens.last_mut() {
            last.space_after = false;
        }
        self
    }

    /// Number of tokens pushed so far
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn build(self) -> Result<Document> {
        Document::from_tokens(self.tokens)
    }
}

//! Triplex Parser - Loading of dependency-annotated documents
//!
//! The extractors never run a linguistic pipeline themselves. They consume
//! documents annotated elsewhere, in one of:
//! - CoNLL-U (UDPipe, Stanza, `spacy-conll`, ...)
//! - spaCy JSON, as written by `Doc.to_json()`
//!
//! Each loader implements the `DocumentLoader` trait and produces a
//! `triplex_core::Document` that every extractor can consume read-only.

use std::path::Path;
use thiserror::Error;

use triplex_core::Document;

pub mod conllu;
pub mod spacy;

pub use conllu::ConlluLoader;
pub use spacy::SpacyJsonLoader;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading an annotated document
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A CoNLL-U row could not be interpreted
    #[error("Malformed CoNLL-U at line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    /// spaCy JSON could not be decoded
    #[error("Invalid spaCy JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Token offsets or head references do not describe a valid document
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<triplex_core::TriplexError> for ParserError {
    fn from(e: triplex_core::TriplexError) -> Self {
        Self::InvalidStructure(e.to_string())
    }
}

// ============================================================================
// Formats
// ============================================================================

/// Supported annotation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Conllu,
    SpacyJson,
    Unknown,
}

impl DocumentFormat {
    /// Detect format from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "conllu" | "conll" => Self::Conllu,
            "json" => Self::SpacyJson,
            _ => Self::Unknown,
        }
    }

    /// Detect format from path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conllu => write!(f, "conllu"),
            Self::SpacyJson => write!(f, "spacy-json"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Loader Trait
// ============================================================================

/// Trait for annotated-document loaders
pub trait DocumentLoader: Send + Sync {
    /// Parse a document from its serialized form
    fn load_str(&self, content: &str) -> Result<Document>;

    /// Get supported formats
    fn supported_formats(&self) -> &[DocumentFormat];

    /// Load a document from a file path
    fn load(&self, path: &Path) -> Result<Document> {
        let content = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        self.load_str(&content)
    }

    /// Check if this loader can handle a format
    fn can_load(&self, format: DocumentFormat) -> bool {
        self.supported_formats().contains(&format)
    }
}

// ============================================================================
// Loader Registry
// ============================================================================

/// Registry of available loaders
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Registry with every built-in loader
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ConlluLoader);
        registry.register(SpacyJsonLoader);
        registry
    }

    /// Register a loader
    pub fn register<L: DocumentLoader + 'static>(&mut self, loader: L) {
        self.loaders.push(Box::new(loader));
    }

    /// Find a loader for a format
    pub fn find_loader(&self, format: DocumentFormat) -> Option<&dyn DocumentLoader> {
        self.loaders
            .iter()
            .find(|l| l.can_load(format))
            .map(|l| l.as_ref())
    }

    /// Load a file using the loader matching its extension
    pub fn load(&self, path: &Path) -> Result<Document> {
        let format = DocumentFormat::from_path(path);

        if format == DocumentFormat::Unknown {
            return Err(ParserError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            ));
        }

        let loader = self
            .find_loader(format)
            .ok_or_else(|| ParserError::UnsupportedFormat(format.to_string()))?;

        let document = loader.load(path)?;
        tracing::debug!(
            path = %path.display(),
            %format,
            tokens = document.len(),
            "loaded annotated document"
        );
        Ok(document)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Tests
// ============================================================================

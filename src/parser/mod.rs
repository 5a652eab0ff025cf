//! The document-parser collaborator: the seam the pool is generic over,
//! plus the default wikitext implementation.

pub mod wikitext;

pub use wikitext::WikitextParser;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One titled span of document text. Insertion order is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, empty for the lead section.
    pub title: String,
    /// Plain text content under the heading.
    pub text: String,
}

/// Ordered sections extracted from one markup document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// The document's sections in order of appearance.
    pub sections: Vec<Section>,
}

impl ParsedDocument {
    /// The document produced for empty input: exactly one section with empty
    /// title and text. Deliberately not an empty sequence, so callers never
    /// special-case empty documents.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sections: vec![Section::default()],
        }
    }
}

/// Application-level parser failure, as opposed to the worker itself dying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Human-readable description of what the parser rejected.
    pub message: String,
}

impl ParseError {
    /// Build an error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Markup-to-structured-document transformation run inside worker units.
///
/// Implementations are assumed synchronous, not natively cancellable, and
/// potentially unbounded in time and memory for adversarial input; the pool
/// compensates with its deadline and kill-and-replace policy. Each worker
/// unit owns its own clone, so implementations must not share mutable state.
pub trait DocumentParser: Send + Sync + Clone + 'static {
    /// Parse `text` into ordered sections.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for input the implementation rejects; the pool
    /// classifies this as an application-level failure.
    fn parse(&self, text: &str) -> Result<ParsedDocument, ParseError>;
}

//! Wire types for the parse endpoint.

use serde::{Deserialize, Serialize};

use crate::parser::Section;

/// Body of `POST /`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseRequest {
    /// Raw wikitext. Absent or empty input parses to a document with a
    /// single empty section.
    #[serde(default)]
    pub wikitext: Option<String>,
    /// Caller-supplied document identifier, used for log correlation only.
    #[serde(default)]
    pub id: String,
    /// Originating corpus or pipeline stage, used for log correlation only.
    #[serde(default)]
    pub source: String,
}

/// Success body: the parsed document as ordered sections.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    /// Sections in document order.
    pub document: Vec<Section>,
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the match a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Cv,
    Job,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Cv => "cv",
            DocumentKind::Job => "job",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every passage of one indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub kind: DocumentKind,
    /// Path the document was loaded from.
    pub source: String,
}

/// Stored per passage: the document metadata plus the chunk position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageMetadata {
    pub kind: DocumentKind,
    pub source: String,
    pub chunk_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DocumentKind::Cv).unwrap(), "\"cv\"");
        assert_eq!(serde_json::to_string(&DocumentKind::Job).unwrap(), "\"job\"");
    }

    #[test]
    fn test_document_kind_display_matches_serde() {
        assert_eq!(DocumentKind::Job.to_string(), "job");
    }
}

pub mod document;

pub use document::{DocumentKind, PassageMetadata, SourceMetadata};

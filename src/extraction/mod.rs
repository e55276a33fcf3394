//! Tag extraction from source code using tree-sitter.
//!
//! Given a language entry and source bytes, the extractor parses the file,
//! runs the language's compiled tag query, and maps each match to a [`Tag`]
//! with method/field qualification, signatures, and enclosing-scope
//! attribution.
//!
//! [`Tag`]: crate::types::Tag

mod tags;

pub use tags::extract_tags;

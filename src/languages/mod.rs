//! Language registry mapping file extensions to tree-sitter grammars,
//! compiled tag queries, and per-language AST adapters.
//!
//! Each supported language contributes one [`LanguageSpec`]. The compiled
//! query is built once and shared across workers (queries are immutable);
//! parsers are created per worker via [`LanguageSpec::new_parser`] because
//! tree-sitter parsers are stateful and not thread-safe.
//!
//! Adding a language means adding a module here plus a capture file under
//! `queries/` - the extractor and graph pipeline never change. The capture
//! vocabulary the extractor understands is closed: `@name`,
//! `@definition.class`, `@definition.function`, `@definition.method`,
//! `@definition.field`, `@reference.call`, `@reference.import`. Anything
//! else in a pattern file is ignored.

mod go;
mod python;
mod ruby;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::{Language, Node, Parser as TsParser, Query, QueryError};

use crate::types::SymbolKind;

/// Adapter walking concrete syntax nodes. Returns `None` when the concept
/// does not apply at this node (e.g. a function that is not a method).
pub type AdapterFn = fn(Node, &[u8]) -> Option<String>;

/// Signature extraction for a definition node.
pub type SignatureFn = fn(Node, SymbolKind, &[u8]) -> String;

/// Configuration and adapters for one supported language.
pub struct LanguageSpec {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    language: Language,
    query: Query,

    /// For lexical-nesting languages (Python, Ruby): the owning class of a
    /// `@definition.function` node, if it is actually a method.
    pub find_method_owner: Option<AdapterFn>,

    /// For receiver-style languages (Go): the receiver type name of a
    /// `@definition.method` node.
    pub find_receiver_type: Option<AdapterFn>,

    /// Qualified name of the function/method lexically enclosing a
    /// reference node. `None` at module level and across closure
    /// boundaries.
    pub find_enclosing_def: Option<AdapterFn>,

    /// Enclosing class/module of a `@definition.field` node. `None` when
    /// the capture sits at module level or inside a function body.
    pub find_enclosing_type: Option<AdapterFn>,

    pub extract_signature: SignatureFn,
}

impl LanguageSpec {
    /// Create a fresh parser for this language. Each worker must own its
    /// parser; only the compiled query is shared.
    pub fn new_parser(&self) -> Result<TsParser, tree_sitter::LanguageError> {
        let mut parser = TsParser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// The compiled tag query, shared across workers.
    pub fn query(&self) -> &Query {
        &self.query
    }
}

/// Builders for every supported language, keyed by name. A builder that
/// fails to compile its query is reported once and left out of the
/// registry; its files then fall under the unknown-language skip path.
const BUILDERS: &[(&str, fn() -> Result<LanguageSpec, QueryError>)] = &[
    ("python", python::spec),
    ("go", go::spec),
    ("ruby", ruby::spec),
];

static REGISTRY: Lazy<HashMap<&'static str, LanguageSpec>> = Lazy::new(|| {
    let mut langs = HashMap::new();
    for (name, build) in BUILDERS {
        match build() {
            Ok(spec) => {
                langs.insert(spec.name, spec);
            }
            Err(e) => {
                eprintln!("Warning: failed to compile tag query for {}: {}", name, e);
            }
        }
    }
    langs
});

static EXTENSION_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for spec in REGISTRY.values() {
        for ext in spec.extensions {
            map.insert(*ext, spec.name);
        }
    }
    map
});

/// Look up a language by its registered name.
pub fn get(name: &str) -> Option<&'static LanguageSpec> {
    REGISTRY.get(name)
}

/// All registered language names, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Map a file extension (without the dot) to a language name.
pub fn for_extension(ext: &str) -> Option<&'static str> {
    EXTENSION_MAP.get(ext).copied()
}

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Source text of a node. Falls back to "" on invalid UTF-8.
pub(crate) fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Replace runs of whitespace with a single space and trim.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s.trim(), " ").into_owned()
}

/// Text of a node's field, or `None` when the field is absent.
pub(crate) fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(n, source).to_string())
        .filter(|s| !s.is_empty())
}

//! Core types for scopemap - the repository cartographer.
//!
//! The data model is deliberately flat: a `Tag` is a single symbol
//! occurrence, a `FileInfo` is a file plus its tags and rank, and the
//! graph layers (dependencies, call edges, call sites) are plain records
//! derived from frozen tag sets. Everything downstream of extraction
//! treats tags as immutable.

use serde::{Deserialize, Serialize};

/// Sentinel caller recorded on a call site that originates from a
/// module-level import rather than a function body. Consumers rely on
/// this value to separate top-of-file imports from real call sites.
pub const IMPORT_CALLER: &str = "<import>";

/// Whether a tag marks a symbol definition or a reference to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Definition,
    Reference,
}

impl TagKind {
    pub fn is_definition(self) -> bool {
        matches!(self, TagKind::Definition)
    }

    pub fn is_reference(self) -> bool {
        matches!(self, TagKind::Reference)
    }
}

/// Syntactic kind of a tagged symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Class,
    Field,
    Function,
    Method,
    Module,
}

impl SymbolKind {
    /// Lowercase name used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Field => "field",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Module => "module",
        }
    }
}

/// A single symbol occurrence extracted from source code.
///
/// Definitions carry a `signature`; references carry the qualified name of
/// their `enclosing` function or method ("" at module level, and "" across
/// closure boundaries). Qualified names take the form `Owner.member` for
/// methods and fields, bare identifiers otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Symbol name, qualified where applicable (e.g. "Server.Handle").
    pub name: String,
    pub kind: TagKind,
    pub symbol_kind: SymbolKind,
    /// Line number (1-indexed) of the symbol name.
    pub line: u32,
    /// Repo-relative path of the containing file.
    pub file: String,
    /// Collapsed-whitespace signature; empty for references.
    pub signature: String,
    /// Qualified name of the enclosing func/method for reference tags;
    /// empty if top-level.
    pub enclosing: String,
}

impl Tag {
    pub fn is_def(&self) -> bool {
        self.kind.is_definition()
    }

    pub fn is_ref(&self) -> bool {
        self.kind.is_reference()
    }
}

/// Metadata and extracted tags for a single source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Repo-relative path.
    pub path: String,
    pub language: String,
    /// Tags in source order.
    pub tags: Vec<Tag>,
    /// PageRank score, filled in by the ranker.
    pub rank: f64,
}

impl FileInfo {
    pub fn new(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            tags: Vec::new(),
            rank: 0.0,
        }
    }

    /// Iterate over this file's definition tags.
    pub fn definitions(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| t.is_def())
    }
}

/// A file-to-file edge: `source` references symbols defined in `target`.
///
/// `symbols` is de-duplicated and preserves first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub source: String,
    pub target: String,
    pub symbols: Vec<String>,
}

/// A function-level call edge, de-duplicated across occurrences.
///
/// Both names are qualified symbol names as they appear in definitions
/// (e.g. "Server.Handle", "greet").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

/// A single call or import occurrence with its source location.
/// Unlike [`CallEdge`], call sites are not de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Qualified caller, or [`IMPORT_CALLER`] for module-level imports.
    pub caller: String,
    pub callee: String,
    pub file: String,
    pub line: u32,
}

/// The complete analyzed repository map, ready for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoMap {
    pub repo_name: String,
    pub root: String,
    /// Files sorted by descending rank (ties broken by ascending path).
    pub files: Vec<FileInfo>,
    pub dependencies: Vec<Dependency>,
    pub call_edges: Vec<CallEdge>,
    pub call_sites: Vec<CallSite>,
    /// Field/method tags for focused member queries. Empty in full-map mode.
    pub members: Vec<Tag>,
}

impl RepoMap {
    pub fn new(repo_name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            root: root.into(),
            ..Default::default()
        }
    }
}

//! scopemap - compact, ranked repository maps for coding agents.
//!
//! scopemap ingests a source repository and emits a low-token map of its
//! files, exported symbols, cross-file dependencies, call edges, and call
//! sites, ranked by structural importance. The map replaces broad initial
//! filesystem exploration for LLM coding assistants.
//!
//! # Architecture
//!
//! ```text
//! File Discovery → Tag Extraction → Graph Building → PageRank → Focus → TOON
//!       ↓               ↓               ↓               ↓         ↓       ↓
//!    ignore        tree-sitter     dependency +     iterative  symbol/  tabular
//!    crate          + .scm          call graphs       power      file    text
//! ```
//!
//! Extraction fans out across a rayon worker pool (one parser per worker
//! per language, compiled queries shared); everything downstream is
//! single-threaded and deterministic.

pub mod cache;
pub mod discovery;
pub mod error;
pub mod extraction;
pub mod focus;
pub mod graph;
pub mod languages;
pub mod pipeline;
pub mod ranking;
pub mod render;
pub mod types;

pub use error::MapError;
pub use pipeline::{build_repo_map, MapOptions, SourceFile};
pub use types::{
    CallEdge, CallSite, Dependency, FileInfo, RepoMap, SymbolKind, Tag, TagKind, IMPORT_CALLER,
};

//! Pipeline orchestration: parallel extraction, graph build, ranking,
//! and focused projection.
//!
//! Only extraction runs concurrently - rayon fans the files out across
//! the worker pool and `collect` reassembles results in input order, so
//! downstream output is deterministic. Each worker thread lazily caches
//! one parser per language it encounters; the compiled queries are shared
//! through the registry. The graph builder, ranker, and focus projector
//! run single-threaded on the already-assembled tag sets.

use std::cell::RefCell;
use std::collections::HashMap;

use rayon::prelude::*;
use tree_sitter::Parser as TsParser;

use crate::error::MapError;
use crate::extraction::extract_tags;
use crate::types::{FileInfo, RepoMap};
use crate::{focus, graph, languages, ranking};

/// One discovered source file, ready for extraction.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Repo-relative path.
    pub path: String,
    /// Registered language name.
    pub language: String,
    pub source: Vec<u8>,
}

/// Optional projection configuration for [`build_repo_map`].
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Keep only the top N ranked files; 0 means no limit.
    pub max_files: usize,
    /// Symbol-substring filter (case-insensitive).
    pub symbol: Option<String>,
    /// File-path-substring filter (case-insensitive).
    pub file: Option<String>,
    /// Surface class fields through the members table.
    pub with_members: bool,
}

thread_local! {
    // Parsers are stateful and not thread-safe; each worker owns one per
    // language it has seen.
    static PARSERS: RefCell<HashMap<&'static str, TsParser>> = RefCell::new(HashMap::new());
}

/// Extract tags for one file on the current worker thread.
///
/// Unknown languages and parser setup failures warn and yield `None`;
/// the file is skipped and the pipeline proceeds.
pub fn extract_file(path: &str, language: &str, source: &[u8]) -> Option<FileInfo> {
    let Some(spec) = languages::get(language) else {
        eprintln!("Warning: {}: unknown language {:?}", path, language);
        return None;
    };

    PARSERS.with(|parsers| {
        let mut parsers = parsers.borrow_mut();
        if !parsers.contains_key(spec.name) {
            match spec.new_parser() {
                Ok(parser) => {
                    parsers.insert(spec.name, parser);
                }
                Err(e) => {
                    eprintln!("Warning: failed to create {} parser: {}", spec.name, e);
                    return None;
                }
            }
        }
        let parser = parsers.get_mut(spec.name).expect("parser just inserted");
        let tags = extract_tags(spec, parser, source, path);
        Some(FileInfo {
            path: path.to_string(),
            language: spec.name.to_string(),
            tags,
            rank: 0.0,
        })
    })
}

/// Extract tags for all files in parallel, preserving input order.
pub fn extract_all(files: &[SourceFile]) -> Vec<FileInfo> {
    files
        .par_iter()
        .map(|f| extract_file(&f.path, &f.language, &f.source))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Build the final map from extracted file infos: dependency graph,
/// PageRank, call graph, call sites, then optional focus projection.
pub fn assemble(
    repo_name: &str,
    root: &str,
    mut file_infos: Vec<FileInfo>,
    opts: &MapOptions,
) -> Result<RepoMap, MapError> {
    if file_infos.is_empty() {
        return Err(MapError::EmptyInput);
    }

    let dependencies = graph::build_dependencies(&file_infos);
    ranking::rank(&mut file_infos, &dependencies);
    let call_edges = graph::build_call_edges(&file_infos);
    let call_sites = graph::build_call_sites(&file_infos);

    let mut rm = RepoMap::new(repo_name, root);
    rm.files = file_infos;
    rm.dependencies = dependencies;
    rm.call_edges = call_edges;
    rm.call_sites = call_sites;

    if opts.max_files > 0 {
        rm = focus::select_top_files(&rm, opts.max_files);
    }
    if let Some(symbol) = opts.symbol.as_deref() {
        rm = focus::filter_by_symbol(&rm, symbol, opts.with_members);
    }
    if let Some(file) = opts.file.as_deref() {
        rm = focus::filter_by_file(&rm, file);
    }

    Ok(rm)
}

/// Full pipeline: parallel extraction followed by [`assemble`].
pub fn build_repo_map(
    repo_name: &str,
    root: &str,
    files: &[SourceFile],
    opts: &MapOptions,
) -> Result<RepoMap, MapError> {
    if files.is_empty() {
        return Err(MapError::EmptyInput);
    }
    assemble(repo_name, root, extract_all(files), opts)
}

//! Cross-file dependency and call graph construction.
//!
//! Three passes over the merged file infos, each deterministic and total:
//! dependencies (file -> file, with the referenced symbol names), call
//! edges (caller -> callee, de-duplicated), and call sites (one record per
//! occurrence, module-level imports under the `<import>` sentinel caller).
//!
//! Determinism notes: when a symbol name is defined in multiple files the
//! defining files are visited in path order, so symbol lists inside a
//! dependency are reproducible. All outputs are sorted on total keys.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::types::{CallEdge, CallSite, Dependency, FileInfo, IMPORT_CALLER};

/// Index of symbol definitions: name -> set of defining files.
/// `BTreeSet` gives the path-sorted iteration the resolver relies on.
fn definition_index(file_infos: &[FileInfo]) -> HashMap<&str, BTreeSet<&str>> {
    let mut defines: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for fi in file_infos {
        for tag in fi.definitions() {
            defines.entry(&tag.name).or_default().insert(&fi.path);
        }
    }
    defines
}

/// Names of all definitions in the repo.
fn known_definitions(file_infos: &[FileInfo]) -> HashSet<&str> {
    file_infos
        .iter()
        .flat_map(|fi| fi.definitions())
        .map(|tag| tag.name.as_str())
        .collect()
}

/// Build dependency edges from cross-file symbol references.
///
/// For every reference in file A to a symbol defined in file B (B != A),
/// the symbol name joins the edge A -> B. Symbol lists are de-duplicated
/// in first-seen order; edges are sorted by (source, target).
pub fn build_dependencies(file_infos: &[FileInfo]) -> Vec<Dependency> {
    let defines = definition_index(file_infos);

    let mut edge_symbols: HashMap<(&str, &str), Vec<&str>> = HashMap::new();

    for fi in file_infos {
        for tag in fi.tags.iter().filter(|t| t.is_ref()) {
            let Some(def_files) = defines.get(tag.name.as_str()) else {
                continue;
            };
            for def_file in def_files {
                if *def_file == fi.path {
                    continue; // no self-edges
                }
                let symbols = edge_symbols.entry((fi.path.as_str(), *def_file)).or_default();
                if !symbols.contains(&tag.name.as_str()) {
                    symbols.push(tag.name.as_str());
                }
            }
        }
    }

    let mut deps: Vec<Dependency> = edge_symbols
        .into_iter()
        .map(|((source, target), symbols)| Dependency {
            source: source.to_string(),
            target: target.to_string(),
            symbols: symbols.into_iter().map(String::from).collect(),
        })
        .collect();

    deps.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
    deps
}

/// Build function-level call edges.
///
/// An edge is emitted only when both endpoints are known definitions and
/// the reference has a non-empty enclosing scope. Edges are de-duplicated
/// and sorted by (caller, callee).
pub fn build_call_edges(file_infos: &[FileInfo]) -> Vec<CallEdge> {
    let known = known_definitions(file_infos);

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::new();

    for fi in file_infos {
        for tag in fi.tags.iter().filter(|t| t.is_ref()) {
            if tag.enclosing.is_empty()
                || !known.contains(tag.name.as_str())
                || !known.contains(tag.enclosing.as_str())
            {
                continue;
            }
            if seen.insert((tag.enclosing.as_str(), tag.name.as_str())) {
                edges.push(CallEdge {
                    caller: tag.enclosing.clone(),
                    callee: tag.name.clone(),
                });
            }
        }
    }

    edges.sort_by(|a, b| (&a.caller, &a.callee).cmp(&(&b.caller, &b.callee)));
    edges
}

/// Build per-occurrence call sites.
///
/// Unlike [`build_call_edges`] nothing is de-duplicated: a function
/// calling another three times yields three records. Module-level
/// references (no enclosing scope) are included under the `<import>`
/// sentinel caller. Sorted by (caller, callee, file, line).
pub fn build_call_sites(file_infos: &[FileInfo]) -> Vec<CallSite> {
    let known = known_definitions(file_infos);

    let mut sites = Vec::new();
    for fi in file_infos {
        for tag in fi.tags.iter().filter(|t| t.is_ref()) {
            if !known.contains(tag.name.as_str()) {
                continue;
            }
            let caller = if tag.enclosing.is_empty() {
                IMPORT_CALLER.to_string()
            } else {
                tag.enclosing.clone()
            };
            assert!(!tag.name.is_empty(), "reference tag with empty name");
            sites.push(CallSite {
                caller,
                callee: tag.name.clone(),
                file: fi.path.clone(),
                line: tag.line,
            });
        }
    }

    sites.sort_by(|a, b| {
        (&a.caller, &a.callee, &a.file, a.line).cmp(&(&b.caller, &b.callee, &b.file, b.line))
    });
    sites
}

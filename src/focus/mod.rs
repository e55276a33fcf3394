//! Focused query projection.
//!
//! Three operators, each producing a new independent [`RepoMap`] without
//! mutating its input: top-N file selection, symbol-substring filtering
//! (with one-hop expansion through the call graph and an opt-in members
//! mode), and file-path-substring filtering. When a symbol filter and a
//! file filter are both requested they compose symbol-then-file.

use std::collections::HashSet;

use crate::types::{FileInfo, RepoMap, SymbolKind, Tag, IMPORT_CALLER};

/// Keep only the top `max_files` ranked files and the graph records that
/// still make sense for them: dependencies with both endpoints retained,
/// call edges whose caller is defined in a retained file, call sites
/// analogously (module-level `<import>` sites follow their file).
///
/// `max_files == 0` or a limit at or beyond the file count returns the
/// input unchanged.
pub fn select_top_files(rm: &RepoMap, max_files: usize) -> RepoMap {
    if max_files == 0 || max_files >= rm.files.len() {
        return rm.clone();
    }

    let selected = &rm.files[..max_files];
    let selected_paths: HashSet<&str> = selected.iter().map(|fi| fi.path.as_str()).collect();
    let selected_defs: HashSet<&str> = selected
        .iter()
        .flat_map(|fi| fi.definitions())
        .map(|t| t.name.as_str())
        .collect();

    let mut out = RepoMap::new(&rm.repo_name, &rm.root);
    out.files = selected.to_vec();

    out.dependencies = rm
        .dependencies
        .iter()
        .filter(|d| {
            selected_paths.contains(d.source.as_str()) && selected_paths.contains(d.target.as_str())
        })
        .cloned()
        .collect();

    out.call_edges = rm
        .call_edges
        .iter()
        .filter(|ce| selected_defs.contains(ce.caller.as_str()))
        .cloned()
        .collect();

    out.call_sites = rm
        .call_sites
        .iter()
        .filter(|cs| {
            if cs.caller == IMPORT_CALLER {
                selected_paths.contains(cs.file.as_str())
            } else {
                selected_defs.contains(cs.caller.as_str())
            }
        })
        .cloned()
        .collect();

    out
}

/// Project the map onto symbols whose name contains `substring`
/// (case-insensitive), expanded one hop through the call graph.
///
/// Field definitions are excluded from matching unless `with_members` is
/// set and nothing else matched, in which case fields match on the
/// unqualified suffix after the last `.` and surface through
/// [`RepoMap::members`]. Dependencies survive when either endpoint file is
/// retained, so an edge is preserved even when only the far endpoint is
/// the focus.
pub fn filter_by_symbol(rm: &RepoMap, substring: &str, with_members: bool) -> RepoMap {
    let needle = substring.to_lowercase();

    let mut matched_symbols: HashSet<String> = HashSet::new();
    let mut matched_classes: HashSet<String> = HashSet::new();
    let mut matched_files: HashSet<String> = HashSet::new();

    for fi in &rm.files {
        for tag in fi.definitions() {
            if tag.symbol_kind == SymbolKind::Field {
                continue;
            }
            if tag.name.to_lowercase().contains(&needle) {
                matched_symbols.insert(tag.name.clone());
                if tag.symbol_kind == SymbolKind::Class {
                    matched_classes.insert(tag.name.clone());
                }
                matched_files.insert(fi.path.clone());
            }
        }
    }

    // Member fallback: when nothing matched, retry against field names
    // using the unqualified part ("User.email" matches "email").
    let mut fallback_fields: Vec<Tag> = Vec::new();
    if with_members && matched_symbols.is_empty() {
        for fi in &rm.files {
            for tag in fi.definitions() {
                if tag.symbol_kind != SymbolKind::Field {
                    continue;
                }
                let unqualified = tag.name.rsplit('.').next().unwrap_or(&tag.name);
                if unqualified.to_lowercase().contains(&needle) {
                    matched_symbols.insert(tag.name.clone());
                    matched_files.insert(fi.path.clone());
                    fallback_fields.push(tag.clone());
                }
            }
        }
    }

    // One hop through the call graph: callers and callees of matched
    // symbols join the projection, and their defining files join the
    // file set.
    let mut related: HashSet<String> = HashSet::new();
    for edge in &rm.call_edges {
        if matched_symbols.contains(&edge.caller) {
            related.insert(edge.callee.clone());
        }
        if matched_symbols.contains(&edge.callee) {
            related.insert(edge.caller.clone());
        }
    }
    for fi in &rm.files {
        if fi.definitions().any(|t| related.contains(&t.name)) {
            matched_files.insert(fi.path.clone());
        }
    }

    let mut out = RepoMap::new(&rm.repo_name, &rm.root);

    for fi in &rm.files {
        if !matched_files.contains(&fi.path) {
            continue;
        }
        let tags: Vec<Tag> = fi
            .tags
            .iter()
            .filter(|t| {
                t.is_def()
                    && t.symbol_kind != SymbolKind::Field
                    && (matched_symbols.contains(&t.name) || related.contains(&t.name))
            })
            .cloned()
            .collect();
        out.files.push(FileInfo {
            path: fi.path.clone(),
            language: fi.language.clone(),
            tags,
            rank: fi.rank,
        });
    }

    if with_members {
        for fi in &rm.files {
            for tag in fi.definitions() {
                if tag.symbol_kind != SymbolKind::Field {
                    continue;
                }
                let owner = tag.name.rsplit_once('.').map(|(o, _)| o).unwrap_or("");
                if matched_classes.contains(owner) {
                    out.members.push(tag.clone());
                }
            }
        }
        if out.members.is_empty() {
            out.members = fallback_fields;
        }
    }

    out.dependencies = rm
        .dependencies
        .iter()
        .filter(|d| matched_files.contains(&d.source) || matched_files.contains(&d.target))
        .cloned()
        .collect();

    out.call_edges = rm
        .call_edges
        .iter()
        .filter(|ce| matched_symbols.contains(&ce.caller) || matched_symbols.contains(&ce.callee))
        .cloned()
        .collect();

    out.call_sites = rm
        .call_sites
        .iter()
        .filter(|cs| matched_symbols.contains(&cs.caller) || matched_symbols.contains(&cs.callee))
        .cloned()
        .collect();

    out
}

/// Project the map onto files whose path contains `substring`
/// (case-insensitive). Dependencies survive on either endpoint; call
/// edges follow callers defined in matched files; call sites follow
/// their recorded file.
pub fn filter_by_file(rm: &RepoMap, substring: &str) -> RepoMap {
    let needle = substring.to_lowercase();

    let matched: HashSet<&str> = rm
        .files
        .iter()
        .map(|fi| fi.path.as_str())
        .filter(|p| p.to_lowercase().contains(&needle))
        .collect();

    let mut out = RepoMap::new(&rm.repo_name, &rm.root);

    out.files = rm
        .files
        .iter()
        .filter(|fi| matched.contains(fi.path.as_str()))
        .cloned()
        .collect();

    let matched_defs: HashSet<&str> = out
        .files
        .iter()
        .flat_map(|fi| fi.definitions())
        .map(|t| t.name.as_str())
        .collect();

    out.dependencies = rm
        .dependencies
        .iter()
        .filter(|d| matched.contains(d.source.as_str()) || matched.contains(d.target.as_str()))
        .cloned()
        .collect();

    out.call_edges = rm
        .call_edges
        .iter()
        .filter(|ce| matched_defs.contains(ce.caller.as_str()))
        .cloned()
        .collect();

    out.call_sites = rm
        .call_sites
        .iter()
        .filter(|cs| matched.contains(cs.file.as_str()))
        .cloned()
        .collect();

    out.members = rm
        .members
        .iter()
        .filter(|t| matched.contains(t.file.as_str()))
        .cloned()
        .collect();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallEdge, CallSite, Dependency, Tag, TagKind};

    fn def(name: &str, kind: SymbolKind, file: &str, line: u32) -> Tag {
        Tag {
            name: name.into(),
            kind: TagKind::Definition,
            symbol_kind: kind,
            line,
            file: file.into(),
            signature: String::new(),
            enclosing: String::new(),
        }
    }

    /// a.go defines Foo and Bar; b.go defines Baz; c.go defines Qux.
    /// Call edges: Foo -> Baz, Qux -> Foo.
    /// Deps: a.go -> b.go (Baz), c.go -> a.go (Foo).
    fn fixture() -> RepoMap {
        let mut rm = RepoMap::new("test", "test");
        rm.files = vec![
            FileInfo {
                path: "a.go".into(),
                language: "go".into(),
                tags: vec![
                    def("Foo", SymbolKind::Function, "a.go", 1),
                    def("Bar", SymbolKind::Function, "a.go", 5),
                ],
                rank: 0.5,
            },
            FileInfo {
                path: "b.go".into(),
                language: "go".into(),
                tags: vec![def("Baz", SymbolKind::Function, "b.go", 1)],
                rank: 0.3,
            },
            FileInfo {
                path: "c.go".into(),
                language: "go".into(),
                tags: vec![def("Qux", SymbolKind::Function, "c.go", 1)],
                rank: 0.2,
            },
        ];
        rm.dependencies = vec![
            Dependency {
                source: "a.go".into(),
                target: "b.go".into(),
                symbols: vec!["Baz".into()],
            },
            Dependency {
                source: "c.go".into(),
                target: "a.go".into(),
                symbols: vec!["Foo".into()],
            },
        ];
        rm.call_edges = vec![
            CallEdge {
                caller: "Foo".into(),
                callee: "Baz".into(),
            },
            CallEdge {
                caller: "Qux".into(),
                callee: "Foo".into(),
            },
        ];
        rm.call_sites = vec![
            CallSite {
                caller: "Foo".into(),
                callee: "Baz".into(),
                file: "a.go".into(),
                line: 10,
            },
            CallSite {
                caller: "Foo".into(),
                callee: "Baz".into(),
                file: "a.go".into(),
                line: 20,
            },
            CallSite {
                caller: "Qux".into(),
                callee: "Foo".into(),
                file: "c.go".into(),
                line: 5,
            },
        ];
        rm
    }

    fn paths(rm: &RepoMap) -> Vec<&str> {
        rm.files.iter().map(|fi| fi.path.as_str()).collect()
    }

    #[test]
    fn top_n_zero_and_oversized_are_identity() {
        let rm = fixture();
        assert_eq!(select_top_files(&rm, 0), rm);
        assert_eq!(select_top_files(&rm, 3), rm);
        assert_eq!(select_top_files(&rm, 99), rm);
    }

    #[test]
    fn top_n_subset() {
        let rm = fixture();
        let got = select_top_files(&rm, 2);
        assert_eq!(paths(&got), vec!["a.go", "b.go"]);
        // Only a.go -> b.go survives; c.go is gone.
        assert_eq!(got.dependencies.len(), 1);
        assert_eq!(got.dependencies[0].source, "a.go");
        // Foo -> Baz survives (Foo defined in a.go); Qux -> Foo does not.
        assert_eq!(got.call_edges.len(), 1);
        assert_eq!(got.call_edges[0].caller, "Foo");
        // Sites from Foo survive; the Qux site does not.
        assert_eq!(got.call_sites.len(), 2);
    }

    #[test]
    fn top_n_one_drops_all_edges() {
        let rm = fixture();
        let got = select_top_files(&rm, 1);
        assert_eq!(got.files.len(), 1);
        assert!(got.dependencies.is_empty());
    }

    #[test]
    fn symbol_match_with_expansion() {
        let rm = fixture();
        let got = filter_by_symbol(&rm, "Foo", false);

        // Foo is in a.go; Foo calls Baz (b.go) and is called by Qux
        // (c.go) - all three files included.
        assert_eq!(got.files.len(), 3);
        // Both call edges touch Foo.
        assert_eq!(got.call_edges.len(), 2);
        // All deps touch the expanded file set.
        assert_eq!(got.dependencies.len(), 2);
        // Sites on either side of Foo: lines 10, 20 (caller) and 5 (callee).
        assert_eq!(got.call_sites.len(), 3);
    }

    #[test]
    fn symbol_no_match() {
        let rm = fixture();
        let got = filter_by_symbol(&rm, "NoSuchSymbol", false);
        assert!(got.files.is_empty());
        assert!(got.dependencies.is_empty());
        assert!(got.call_edges.is_empty());
        assert!(got.call_sites.is_empty());
    }

    #[test]
    fn symbol_match_is_case_insensitive() {
        let rm = fixture();
        let got = filter_by_symbol(&rm, "foo", false);
        assert!(paths(&got).contains(&"a.go"));
    }

    #[test]
    fn symbol_substring_matches_multiple() {
        let rm = fixture();
        // "ba" matches Bar (a.go) and Baz (b.go).
        let got = filter_by_symbol(&rm, "ba", false);
        assert!(got.files.len() >= 2);
    }

    #[test]
    fn symbol_expansion_pulls_in_callers() {
        let rm = fixture();
        // Baz is defined in b.go; Foo calls Baz, so a.go joins via
        // expansion.
        let got = filter_by_symbol(&rm, "Baz", false);
        let got_paths = paths(&got);
        assert!(got_paths.contains(&"b.go"));
        assert!(got_paths.contains(&"a.go"));
    }

    #[test]
    fn symbol_deps_kept_on_either_endpoint() {
        let rm = fixture();
        let got = filter_by_symbol(&rm, "Baz", false);
        assert!(got
            .dependencies
            .iter()
            .any(|d| d.source == "a.go" && d.target == "b.go"));
    }

    #[test]
    fn symbol_trims_unrelated_definitions() {
        let rm = fixture();
        let got = filter_by_symbol(&rm, "Foo", false);
        let a = got.files.iter().find(|fi| fi.path == "a.go").unwrap();
        // Bar is neither matched nor call-related; it is trimmed.
        assert!(a.tags.iter().all(|t| t.name != "Bar"));
        assert!(a.tags.iter().any(|t| t.name == "Foo"));
    }

    #[test]
    fn symbol_sites_empty_when_symbol_uninvolved() {
        let rm = fixture();
        let got = filter_by_symbol(&rm, "Bar", false);
        assert!(got.call_sites.is_empty());
    }

    fn members_fixture() -> RepoMap {
        let mut rm = RepoMap::new("test", "test");
        rm.files = vec![FileInfo {
            path: "user.py".into(),
            language: "python".into(),
            tags: vec![
                def("User", SymbolKind::Class, "user.py", 1),
                def("User.name", SymbolKind::Field, "user.py", 2),
                def("User.email", SymbolKind::Field, "user.py", 3),
                def("Widget.size", SymbolKind::Field, "user.py", 9),
            ],
            rank: 1.0,
        }];
        rm
    }

    #[test]
    fn members_included_for_matched_class() {
        let rm = members_fixture();
        let got = filter_by_symbol(&rm, "User", true);
        let member_names: Vec<&str> = got.members.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(member_names, vec!["User.name", "User.email"]);
        // Fields stay out of the symbols view.
        let user_file = &got.files[0];
        assert!(user_file
            .tags
            .iter()
            .all(|t| t.symbol_kind != SymbolKind::Field));
    }

    #[test]
    fn members_off_without_flag() {
        let rm = members_fixture();
        let got = filter_by_symbol(&rm, "User", false);
        assert!(got.members.is_empty());
    }

    #[test]
    fn member_fallback_matches_field_suffix() {
        let rm = members_fixture();
        // "email" matches no class or function; with members mode the
        // field name matches on its unqualified suffix.
        let got = filter_by_symbol(&rm, "email", true);
        assert_eq!(got.files.len(), 1);
        assert_eq!(got.members.len(), 1);
        assert_eq!(got.members[0].name, "User.email");
    }

    #[test]
    fn member_fallback_requires_flag() {
        let rm = members_fixture();
        let got = filter_by_symbol(&rm, "email", false);
        assert!(got.files.is_empty());
        assert!(got.members.is_empty());
    }

    #[test]
    fn file_match() {
        let rm = fixture();
        let got = filter_by_file(&rm, "a.go");
        assert_eq!(paths(&got), vec!["a.go"]);
        // Both deps touch a.go.
        assert_eq!(got.dependencies.len(), 2);
        // Call edges from functions defined in a.go: Foo -> Baz.
        assert_eq!(got.call_edges.len(), 1);
        assert_eq!(got.call_edges[0].caller, "Foo");
        // Sites recorded in a.go: lines 10 and 20.
        assert_eq!(got.call_sites.len(), 2);
        assert!(got.call_sites.iter().all(|cs| cs.file == "a.go"));
    }

    #[test]
    fn file_no_match() {
        let rm = fixture();
        let got = filter_by_file(&rm, "no_such_file.go");
        assert!(got.files.is_empty());
    }

    #[test]
    fn file_match_is_case_insensitive() {
        let rm = fixture();
        let got = filter_by_file(&rm, "A.GO");
        assert!(!got.files.is_empty());
    }

    #[test]
    fn file_substring_matches_all() {
        let rm = fixture();
        let got = filter_by_file(&rm, ".go");
        assert_eq!(got.files.len(), 3);
    }

    #[test]
    fn file_filter_is_idempotent() {
        let rm = fixture();
        let once = filter_by_file(&rm, "a.go");
        let twice = filter_by_file(&once, "a.go");
        assert_eq!(once, twice);
    }

    #[test]
    fn symbol_then_file_composition() {
        let rm = fixture();
        // Symbol filter expands to three files; the file filter then
        // narrows to b.go while keeping its surviving edges.
        let got = filter_by_file(&filter_by_symbol(&rm, "Foo", false), "b.go");
        assert_eq!(paths(&got), vec!["b.go"]);
        assert!(got
            .dependencies
            .iter()
            .any(|d| d.source == "a.go" && d.target == "b.go"));
    }
}

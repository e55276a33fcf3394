//! TOON (token-oriented object notation) encoding.
//!
//! The map serializes as a handful of tabular sections with a one-line
//! header each: `name[rows]{columns}:` followed by indented comma-joined
//! rows. Values quote only when they must (structural characters,
//! whitespace, keywords), which keeps the token count low for LLM
//! consumption.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::RepoMap;

static NEEDS_QUOTING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[,:"\\{}\[\]]"#).unwrap());
static LOOKS_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:0|[1-9]\d*)(?:\.\d+)?$").unwrap());

const KEYWORDS: &[&str] = &["true", "false", "null"];

/// Encode a repo map as TOON text.
///
/// When `focused` is set (a symbol or file query produced this map), the
/// callsites table moves directly after files so downstream truncation
/// cuts noise rather than the primary deliverable.
pub fn encode(rm: &RepoMap, focused: bool) -> String {
    let mut parts = Vec::new();

    parts.push(format!("repo: {}", encode_value(&rm.repo_name)));
    parts.push(format!("root: {}", encode_value(&rm.root)));

    let file_rows: Vec<Vec<String>> = rm
        .files
        .iter()
        .map(|fi| {
            vec![
                fi.path.clone(),
                fi.language.clone(),
                format!("{:.4}", fi.rank),
            ]
        })
        .collect();
    parts.push(format_tabular(
        "files",
        &["path", "language", "rank"],
        file_rows,
    ));

    if focused && !rm.call_sites.is_empty() {
        parts.push(encode_sites(rm));
    }

    let symbol_rows: Vec<Vec<String>> = rm
        .files
        .iter()
        .flat_map(|fi| {
            fi.definitions().map(|tag| {
                vec![
                    fi.path.clone(),
                    tag.name.clone(),
                    tag.symbol_kind.as_str().to_string(),
                    tag.line.to_string(),
                    tag.signature.clone(),
                ]
            })
        })
        .collect();
    parts.push(format_tabular(
        "symbols",
        &["file", "name", "kind", "line", "signature"],
        symbol_rows,
    ));

    let dep_rows: Vec<Vec<String>> = rm
        .dependencies
        .iter()
        .map(|d| vec![d.source.clone(), d.target.clone(), d.symbols.join(" ")])
        .collect();
    parts.push(format_tabular(
        "dependencies",
        &["source", "target", "symbols"],
        dep_rows,
    ));

    let call_rows: Vec<Vec<String>> = rm
        .call_edges
        .iter()
        .map(|ce| vec![ce.caller.clone(), ce.callee.clone()])
        .collect();
    parts.push(format_tabular("calls", &["caller", "callee"], call_rows));

    if !focused && !rm.call_sites.is_empty() {
        parts.push(encode_sites(rm));
    }

    if !rm.members.is_empty() {
        let member_rows: Vec<Vec<String>> = rm
            .members
            .iter()
            .map(|tag| {
                vec![
                    tag.file.clone(),
                    tag.name.clone(),
                    tag.symbol_kind.as_str().to_string(),
                    tag.line.to_string(),
                    tag.signature.clone(),
                ]
            })
            .collect();
        parts.push(format_tabular(
            "members",
            &["file", "name", "kind", "line", "signature"],
            member_rows,
        ));
    }

    parts.join("\n")
}

fn encode_sites(rm: &RepoMap) -> String {
    let rows: Vec<Vec<String>> = rm
        .call_sites
        .iter()
        .map(|cs| {
            vec![
                cs.caller.clone(),
                cs.callee.clone(),
                cs.file.clone(),
                cs.line.to_string(),
            ]
        })
        .collect();
    format_tabular("callsites", &["caller", "callee", "file", "line"], rows)
}

fn format_tabular(name: &str, columns: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut out = format!("{}[{}]{{{}}}:", name, rows.len(), columns.join(","));
    for row in rows {
        let encoded: Vec<String> = row.iter().map(|cell| encode_value(cell)).collect();
        out.push_str("\n  ");
        out.push_str(&encoded.join(","));
    }
    out
}

fn encode_value(value: &str) -> String {
    if value.is_empty() {
        return "\"\"".to_string();
    }
    if value != value.trim() {
        return quote(value);
    }
    if value.contains(['\n', '\r', '\t']) {
        return quote(value);
    }
    if KEYWORDS.contains(&value.to_lowercase().as_str()) {
        return quote(value);
    }
    if LOOKS_NUMERIC.is_match(value) {
        return value.to_string();
    }
    if NEEDS_QUOTING.is_match(value) {
        return quote(value);
    }
    if value.starts_with('-') {
        return quote(value);
    }
    value.to_string()
}

fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("\"{}\"", escaped)
}

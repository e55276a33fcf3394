//! Query-match to tag conversion.
//!
//! Each query match carries a `@name` capture (the symbol name in source)
//! and one pattern capture from the closed vocabulary. A match missing
//! either is skipped, as is any capture name outside the vocabulary -
//! that is the extension point for language files to bind helper captures
//! for their `#match?` predicates.
//!
//! Error semantics: a file that fails to parse yields an empty tag list
//! and a stderr warning; extraction never fails the pipeline.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser as TsParser, QueryCursor};

use crate::languages::LanguageSpec;
use crate::types::{SymbolKind, Tag, TagKind};

/// Map a pattern capture name to its tag classification.
fn capture_kind(name: &str) -> Option<(TagKind, SymbolKind)> {
    match name {
        "definition.class" => Some((TagKind::Definition, SymbolKind::Class)),
        "definition.function" => Some((TagKind::Definition, SymbolKind::Function)),
        "definition.method" => Some((TagKind::Definition, SymbolKind::Method)),
        "definition.field" => Some((TagKind::Definition, SymbolKind::Field)),
        "reference.call" => Some((TagKind::Reference, SymbolKind::Function)),
        "reference.import" => Some((TagKind::Reference, SymbolKind::Module)),
        _ => None,
    }
}

/// Extract definition and reference tags from one source file.
///
/// The parser must have been created for `lang` (see
/// [`LanguageSpec::new_parser`]); the compiled query is shared. `file_path`
/// is recorded on each tag and should be the repo-relative path.
pub fn extract_tags(
    lang: &LanguageSpec,
    parser: &mut TsParser,
    source: &[u8],
    file_path: &str,
) -> Vec<Tag> {
    if source.is_empty() {
        return Vec::new();
    }

    let tree = match parser.parse(source, None) {
        Some(t) => t,
        None => {
            eprintln!("Warning: failed to parse {}", file_path);
            return Vec::new();
        }
    };

    let query = lang.query();
    let capture_names = query.capture_names();

    let mut tags = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source);

    while let Some(m) = matches.next() {
        let mut name_node: Option<Node> = None;
        let mut pattern: Option<(Node, TagKind, SymbolKind)> = None;

        for capture in m.captures {
            let cname = capture_names[capture.index as usize];
            if cname == "name" {
                name_node = Some(capture.node);
            } else if let Some((kind, symbol_kind)) = capture_kind(cname) {
                pattern = Some((capture.node, kind, symbol_kind));
            }
        }

        let (Some(name_node), Some((pattern_node, kind, mut symbol_kind))) = (name_node, pattern)
        else {
            continue;
        };

        let raw = crate::languages::node_text(name_node, source);
        // Ruby symbol literals carry a leading colon.
        let name = raw.strip_prefix(':').unwrap_or(raw);
        if name.is_empty() {
            continue;
        }

        let mut effective = name.to_string();

        match (kind, symbol_kind) {
            (TagKind::Definition, SymbolKind::Method) => {
                // Receiver-style methodhood (e.g. Go).
                if let Some(owner) = lang
                    .find_receiver_type
                    .and_then(|f| f(pattern_node, source))
                {
                    effective = format!("{}.{}", owner, name);
                }
            }
            (TagKind::Definition, SymbolKind::Function) => {
                // Lexical methodhood (e.g. Python, Ruby): reclassify when
                // the function body sits inside a class.
                if let Some(owner) = lang.find_method_owner.and_then(|f| f(pattern_node, source)) {
                    symbol_kind = SymbolKind::Method;
                    effective = format!("{}.{}", owner, name);
                }
            }
            (TagKind::Definition, SymbolKind::Field) => {
                // Fields are only class-level state. The pattern also
                // fires at module level and inside function bodies; those
                // captures have no enclosing type and are dropped.
                match lang
                    .find_enclosing_type
                    .and_then(|f| f(pattern_node, source))
                {
                    Some(owner) => effective = format!("{}.{}", owner, name),
                    None => continue,
                }
            }
            _ => {}
        }

        let signature = if kind.is_definition() {
            (lang.extract_signature)(pattern_node, symbol_kind, source)
        } else {
            String::new()
        };

        let enclosing = if kind.is_reference() && symbol_kind == SymbolKind::Function {
            lang.find_enclosing_def
                .and_then(|f| f(pattern_node, source))
                .unwrap_or_default()
        } else {
            String::new()
        };

        tags.push(Tag {
            name: effective,
            kind,
            symbol_kind,
            line: name_node.start_position().row as u32 + 1,
            file: file_path.to_string(),
            signature,
            enclosing,
        });
    }

    tags
}

//! Go language adapter.
//!
//! Go expresses methodhood directly in the declaration: a
//! `method_declaration` carries a receiver parameter list, and the
//! receiver's type (with any pointer stripped) becomes the owner in the
//! qualified name. Go import specs are string paths rather than symbol
//! names, so the query emits no import references; cross-file linkage
//! comes entirely from call references.

use tree_sitter::{Node, QueryError};

use super::{collapse_whitespace, field_text, node_text, LanguageSpec};
use crate::types::SymbolKind;

const QUERY: &str = include_str!("../../queries/go.scm");

pub(super) fn spec() -> Result<LanguageSpec, QueryError> {
    let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
    let query = tree_sitter::Query::new(&language, QUERY)?;
    Ok(LanguageSpec {
        name: "go",
        extensions: &["go"],
        language,
        query,
        find_method_owner: None,
        find_receiver_type: Some(find_receiver_type),
        find_enclosing_def: Some(find_enclosing_def),
        find_enclosing_type: None,
        extract_signature,
    })
}

/// Receiver type name of a `method_declaration`, unwrapping `pointer_type`.
/// `(s *Server)` and `(s Server)` both yield "Server".
fn find_receiver_type(node: Node, source: &[u8]) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    for param in receiver.named_children(&mut cursor) {
        if param.kind() != "parameter_declaration" {
            continue;
        }
        let ty = param.child_by_field_name("type")?;
        return type_identifier_text(ty, source);
    }
    None
}

fn type_identifier_text(ty: Node, source: &[u8]) -> Option<String> {
    match ty.kind() {
        "type_identifier" => Some(node_text(ty, source).to_string()),
        "pointer_type" | "generic_type" => {
            let mut cursor = ty.walk();
            let result = ty
                .named_children(&mut cursor)
                .find(|n| n.kind() == "type_identifier")
                .map(|n| node_text(n, source).to_string());
            result
        }
        _ => None,
    }
}

/// Qualified name of the function or method containing a reference node.
/// Calls inside a `func_literal` are not attributed to the surrounding
/// function.
fn find_enclosing_def(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "func_literal" => return None,
            "function_declaration" => return field_text(n, "name", source),
            "method_declaration" => {
                let name = field_text(n, "name", source)?;
                return match find_receiver_type(n, source) {
                    Some(owner) => Some(format!("{}.{}", owner, name)),
                    None => Some(name),
                };
            }
            _ => {}
        }
        current = n.parent();
    }
    None
}

fn extract_signature(node: Node, kind: SymbolKind, source: &[u8]) -> String {
    if kind == SymbolKind::Class {
        return type_signature(node, source);
    }
    function_signature(node, source)
}

/// Type definitions serialize as the bare type name.
fn type_signature(node: Node, source: &[u8]) -> String {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() == "type_spec" {
            if let Some(name) = field_text(spec, "name", source) {
                return name;
            }
        }
    }
    String::new()
}

/// "name(params) result" with the receiver elided for methods; the
/// `parameters` field excludes the receiver, which lives in its own field.
fn function_signature(node: Node, source: &[u8]) -> String {
    let name = field_text(node, "name", source).unwrap_or_default();
    let params = field_text(node, "parameters", source)
        .map(|p| collapse_whitespace(&p))
        .unwrap_or_default();
    let mut sig = format!("{}{}", name, params);
    if let Some(result) = field_text(node, "result", source) {
        sig.push(' ');
        sig.push_str(&collapse_whitespace(&result));
    }
    sig
}

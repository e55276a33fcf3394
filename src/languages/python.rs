//! Python language adapter.
//!
//! Python methodhood is lexical: a `function_definition` is a method when
//! its enclosing block belongs to a `class_definition` (possibly through a
//! `decorated_definition` wrapper). Class-level state is an `assignment`
//! directly in the class body; the same pattern also fires inside method
//! bodies and at module level, which `find_enclosing_type` filters out.

use tree_sitter::{Node, QueryError};

use super::{collapse_whitespace, field_text, node_text, LanguageSpec};
use crate::types::SymbolKind;

const QUERY: &str = include_str!("../../queries/python.scm");

pub(super) fn spec() -> Result<LanguageSpec, QueryError> {
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    let query = tree_sitter::Query::new(&language, QUERY)?;
    Ok(LanguageSpec {
        name: "python",
        extensions: &["py"],
        language,
        query,
        find_method_owner: Some(find_method_owner),
        find_receiver_type: None,
        find_enclosing_def: Some(find_enclosing_def),
        find_enclosing_type: Some(find_enclosing_type),
        extract_signature,
    })
}

/// The class owning a function definition, when the function is a method.
///
/// Direct nesting: func -> block -> class_definition. Decorated:
/// func -> decorated_definition -> block -> class_definition.
fn enclosing_class(func_node: Node) -> Option<Node> {
    let parent = func_node.parent()?;

    if parent.kind() == "block" {
        let gp = parent.parent()?;
        if gp.kind() == "class_definition" {
            return Some(gp);
        }
        return None;
    }

    if parent.kind() == "decorated_definition" {
        let gp = parent.parent()?;
        if gp.kind() == "block" {
            let ggp = gp.parent()?;
            if ggp.kind() == "class_definition" {
                return Some(ggp);
            }
        }
    }

    None
}

fn find_method_owner(func_node: Node, source: &[u8]) -> Option<String> {
    field_text(enclosing_class(func_node)?, "name", source)
}

/// Qualified name of the function or method containing a reference node,
/// e.g. "MyClass.method" or "func_name". `None` at module top level.
/// A reference inside a `lambda` is not attributed to the surrounding
/// function.
fn find_enclosing_def(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "lambda" => return None,
            "function_definition" => {
                let func = field_text(n, "name", source)?;
                if let Some(class_node) = enclosing_class(n) {
                    if let Some(class) = field_text(class_node, "name", source) {
                        return Some(format!("{}.{}", class, func));
                    }
                }
                return Some(func);
            }
            _ => {}
        }
        current = n.parent();
    }
    None
}

/// Enclosing class of a field capture. `None` when the assignment sits at
/// module level or inside a function body (not class-level state).
fn find_enclosing_type(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "class_definition" => return field_text(n, "name", source),
            "function_definition" | "lambda" => return None,
            _ => {}
        }
        current = n.parent();
    }
    None
}

fn extract_signature(node: Node, kind: SymbolKind, source: &[u8]) -> String {
    match kind {
        SymbolKind::Class => class_signature(node, source),
        SymbolKind::Field => field_signature(node, source),
        _ => function_signature(node, source),
    }
}

/// "Name(Bases)" when the class has superclasses, otherwise "Name".
fn class_signature(node: Node, source: &[u8]) -> String {
    let name = field_text(node, "name", source).unwrap_or_default();
    match field_text(node, "superclasses", source) {
        Some(bases) => format!("{}{}", name, collapse_whitespace(&bases)),
        None => name,
    }
}

/// "name: annotation" for annotated assignments, otherwise just "name".
fn field_signature(node: Node, source: &[u8]) -> String {
    if node.kind() == "assignment" {
        let name = node
            .child_by_field_name("left")
            .filter(|n| n.kind() == "identifier")
            .map(|n| node_text(n, source).to_string());
        if let Some(name) = name {
            return match field_text(node, "type", source) {
                Some(annotation) => format!("{}: {}", name, annotation),
                None => name,
            };
        }
    }
    collapse_whitespace(node_text(node, source))
}

/// "name(params)" with an optional " -> result" suffix.
fn function_signature(node: Node, source: &[u8]) -> String {
    let name = field_text(node, "name", source).unwrap_or_default();
    let params = field_text(node, "parameters", source)
        .map(|p| collapse_whitespace(&p))
        .unwrap_or_default();
    let mut sig = format!("{}{}", name, params);
    if let Some(ret) = field_text(node, "return_type", source) {
        sig.push_str(" -> ");
        sig.push_str(&ret);
    }
    sig
}

//! Ruby language adapter.
//!
//! Ruby methodhood is lexical like Python's, but the owner can be a
//! `class` or a `module` and methods come in two shapes (`method` and
//! `singleton_method` for `def self.foo`). Fields are `attr_accessor` /
//! `attr_reader` / `attr_writer` calls in a class body; their symbol
//! arguments carry a leading colon that the extractor strips.

use tree_sitter::{Node, QueryError};

use super::{collapse_whitespace, field_text, node_text, LanguageSpec};
use crate::types::SymbolKind;

const QUERY: &str = include_str!("../../queries/ruby.scm");

pub(super) fn spec() -> Result<LanguageSpec, QueryError> {
    let language: tree_sitter::Language = tree_sitter_ruby::LANGUAGE.into();
    let query = tree_sitter::Query::new(&language, QUERY)?;
    Ok(LanguageSpec {
        name: "ruby",
        extensions: &["rb"],
        language,
        query,
        find_method_owner: Some(find_method_owner),
        find_receiver_type: None,
        find_enclosing_def: Some(find_enclosing_def),
        find_enclosing_type: Some(find_enclosing_type),
        extract_signature,
    })
}

fn is_method_node(kind: &str) -> bool {
    kind == "method" || kind == "singleton_method"
}

fn is_owner_node(kind: &str) -> bool {
    kind == "class" || kind == "module"
}

/// Name of a class or module node ("Foo" or "Foo::Bar").
fn owner_name(node: Node, source: &[u8]) -> Option<String> {
    field_text(node, "name", source)
}

/// Nearest enclosing class or module of a method definition.
fn find_method_owner(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        if is_owner_node(n.kind()) {
            return owner_name(n, source);
        }
        current = n.parent();
    }
    None
}

/// Qualified name of the method containing a reference node, e.g.
/// "MyClass.method" or "method_name". `None` at class-body or script top
/// level. Calls inside a `lambda` are not attributed to the surrounding
/// method; `do ... end` blocks are (they belong to the calling method).
fn find_enclosing_def(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        let kind = n.kind();
        if kind == "lambda" {
            return None;
        }
        if is_method_node(kind) {
            let method = field_text(n, "name", source)?;
            if let Some(owner) = find_method_owner(n, source) {
                return Some(format!("{}.{}", owner, method));
            }
            return Some(method);
        }
        current = n.parent();
    }
    None
}

/// Enclosing class or module of an accessor field capture.
fn find_enclosing_type(node: Node, source: &[u8]) -> Option<String> {
    let mut current = node.parent();
    while let Some(n) = current {
        let kind = n.kind();
        if is_owner_node(kind) {
            return owner_name(n, source);
        }
        if is_method_node(kind) {
            return None;
        }
        current = n.parent();
    }
    None
}

fn extract_signature(node: Node, kind: SymbolKind, source: &[u8]) -> String {
    match kind {
        SymbolKind::Class => class_signature(node, source),
        SymbolKind::Field => accessor_keyword(node, source),
        _ => method_signature(node, source),
    }
}

/// "Name < Super" when a superclass is present, otherwise "Name".
fn class_signature(node: Node, source: &[u8]) -> String {
    let name = field_text(node, "name", source).unwrap_or_default();
    let superclass = node.child_by_field_name("superclass").and_then(|sc| {
        let mut cursor = sc.walk();
        let result = sc
            .named_children(&mut cursor)
            .find(|n| n.kind() == "constant" || n.kind() == "scope_resolution")
            .map(|n| node_text(n, source).to_string());
        result
    });
    match superclass {
        Some(sup) => format!("{} < {}", name, sup),
        None => name,
    }
}

/// Field signatures are the accessor keyword itself ("attr_accessor",
/// "attr_reader", "attr_writer"). The field node is the call expression.
fn accessor_keyword(node: Node, source: &[u8]) -> String {
    field_text(node, "method", source).unwrap_or_default()
}

/// "name(params)" when the method declares parameters, otherwise "name".
fn method_signature(node: Node, source: &[u8]) -> String {
    let name = field_text(node, "name", source).unwrap_or_default();
    match field_text(node, "parameters", source) {
        Some(params) => format!("{}{}", name, collapse_whitespace(&params)),
        None => name,
    }
}

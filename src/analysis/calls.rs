//! Call-site inventory with best-effort callee resolution.
//!
//! Callee names are display names, not bindings: a bare identifier
//! resolves directly, a property chain joins with dots (bounded depth,
//! `this` kept, dynamic access as `[computed]`), and a call on the result
//! of another call resolves to `inner().prop` tagged chained to mark it
//! approximate.
//!
//! The enclosing-caller name comes from a typed frame stack maintained
//! during one recursive walk: the innermost frame that names a scope wins —
//! a named function declaration, a method (qualified by the nearest class
//! frame), or a function expression bound to a variable. No frame means
//! top-level code.

use tree_sitter::Node;

use super::{named_children, start_line, CallKind, CallRecord};
use crate::parser::ParsedSource;

/// Maximum property-chain segments walked when naming a callee.
const MAX_CHAIN_DEPTH: usize = 5;

/// One enclosing scope on the walk stack.
#[derive(Debug, Clone)]
enum ScopeFrame {
    /// Named class declaration or expression; qualifies method frames.
    Class(String),
    /// Named function declaration.
    Function(String),
    /// Method or object-literal property holding a function.
    Method(String),
    /// Function expression or arrow bound to a variable.
    VarFunction(String),
    /// Function-like scope with no usable name.
    Anonymous,
}

/// Extract all call records from a parsed file.
pub fn extract_calls(parsed: &ParsedSource) -> Vec<CallRecord> {
    let mut calls = Vec::new();
    let mut frames = Vec::new();
    walk(parsed.tree.root_node(), parsed, &mut frames, &mut calls);
    calls
}

fn walk(
    node: Node<'_>,
    parsed: &ParsedSource,
    frames: &mut Vec<ScopeFrame>,
    calls: &mut Vec<CallRecord>,
) {
    if node.kind() == "call_expression" {
        if let Some(callee) = node.child_by_field_name("function") {
            if let Some((name, kind)) = resolve_callee(callee, parsed) {
                calls.push(CallRecord {
                    caller: enclosing_caller(frames),
                    callee: name,
                    line: start_line(node),
                    kind,
                });
            }
        }
    }

    let frame = frame_for(node, parsed);
    let pushed = frame.is_some();
    if let Some(frame) = frame {
        frames.push(frame);
    }

    for child in named_children(node) {
        walk(child, parsed, frames, calls);
    }

    if pushed {
        frames.pop();
    }
}

/// Frame contributed by this node, if it opens a named scope.
fn frame_for(node: Node<'_>, parsed: &ParsedSource) -> Option<ScopeFrame> {
    let name_text = |n: Node<'_>| parsed.node_text(n).to_string();

    match node.kind() {
        "class_declaration" | "class" => node
            .child_by_field_name("name")
            .map(|n| ScopeFrame::Class(name_text(n))),
        "function_declaration" | "generator_function_declaration" => Some(
            node.child_by_field_name("name")
                .map(|n| ScopeFrame::Function(name_text(n)))
                .unwrap_or(ScopeFrame::Anonymous),
        ),
        "method_definition" => Some(
            node.child_by_field_name("name")
                .filter(|n| n.kind() != "computed_property_name")
                .map(|n| ScopeFrame::Method(name_text(n)))
                .unwrap_or(ScopeFrame::Method("[computed]".to_string())),
        ),
        // { handler: () => {} } — the pair names the function it holds
        "pair" => {
            let value_is_function = node
                .child_by_field_name("value")
                .map(|v| {
                    matches!(
                        v.kind(),
                        "arrow_function" | "function_expression" | "function" | "generator_function"
                    )
                })
                .unwrap_or(false);
            if !value_is_function {
                return None;
            }
            node.child_by_field_name("key")
                .filter(|k| matches!(k.kind(), "property_identifier" | "string"))
                .map(|k| {
                    ScopeFrame::Method(
                        name_text(k)
                            .trim_matches(|c| c == '"' || c == '\'')
                            .to_string(),
                    )
                })
        }
        "arrow_function" | "function_expression" | "function" | "generator_function" => {
            // Named after the variable only when directly bound to one.
            let binding = node
                .parent()
                .filter(|p| p.kind() == "variable_declarator")
                .and_then(|p| p.child_by_field_name("name"))
                .filter(|n| n.kind() == "identifier");
            Some(match binding {
                Some(n) => ScopeFrame::VarFunction(name_text(n)),
                None => ScopeFrame::Anonymous,
            })
        }
        _ => None,
    }
}

/// Innermost frame that names the enclosing scope; None for top-level.
fn enclosing_caller(frames: &[ScopeFrame]) -> Option<String> {
    for (idx, frame) in frames.iter().enumerate().rev() {
        match frame {
            ScopeFrame::Function(name) | ScopeFrame::VarFunction(name) => {
                return Some(name.clone());
            }
            ScopeFrame::Method(name) => {
                let class = frames[..idx].iter().rev().find_map(|f| match f {
                    ScopeFrame::Class(c) => Some(c.clone()),
                    _ => None,
                });
                return Some(match class {
                    Some(class) => format!("{}.{}", class, name),
                    None => name.clone(),
                });
            }
            ScopeFrame::Class(_) | ScopeFrame::Anonymous => continue,
        }
    }
    None
}

/// Resolve a callee node to a display name.
fn resolve_callee(node: Node<'_>, parsed: &ParsedSource) -> Option<(String, CallKind)> {
    match node.kind() {
        "identifier" => Some((parsed.node_text(node).to_string(), CallKind::Direct)),
        "member_expression" | "subscript_expression" => resolve_member_chain(node, parsed),
        _ => None,
    }
}

fn resolve_member_chain(node: Node<'_>, parsed: &ParsedSource) -> Option<(String, CallKind)> {
    let mut parts = Vec::new();
    let mut current = node;
    let mut depth = 0;

    while depth < MAX_CHAIN_DEPTH {
        match current.kind() {
            "member_expression" => {
                let segment = current
                    .child_by_field_name("property")
                    .map(|p| parsed.node_text(p).to_string())
                    .unwrap_or_else(|| "[computed]".to_string());
                parts.insert(0, segment);
            }
            "subscript_expression" => {
                let segment = current
                    .child_by_field_name("index")
                    .filter(|i| matches!(i.kind(), "string" | "number"))
                    .map(|i| {
                        parsed
                            .node_text(i)
                            .trim_matches(|c| c == '"' || c == '\'')
                            .to_string()
                    })
                    .unwrap_or_else(|| "[computed]".to_string());
                parts.insert(0, segment);
            }
            _ => break,
        }
        match current.child_by_field_name("object") {
            Some(object) => current = object,
            None => break,
        }
        depth += 1;
    }

    match current.kind() {
        "identifier" => parts.insert(0, parsed.node_text(current).to_string()),
        "this" => parts.insert(0, "this".to_string()),
        "call_expression" => {
            // Chained call like foo().bar() — resolve the inner callee and
            // mark the whole name approximate.
            let inner = current
                .child_by_field_name("function")
                .and_then(|f| resolve_callee(f, parsed))
                .map(|(name, _)| name)
                .unwrap_or_else(|| "[computed]".to_string());
            parts.insert(0, format!("{}()", inner));
            return Some((parts.join("."), CallKind::Chained));
        }
        _ => {}
    }

    if parts.is_empty() {
        return None;
    }
    let kind = if parts.len() > 1 {
        CallKind::Member
    } else {
        CallKind::Direct
    };
    Some((parts.join("."), kind))
}

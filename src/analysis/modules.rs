//! Module info extraction: imports and exports.
//!
//! Scans only the top-level statements of the program node, the way the
//! language defines module structure. Re-exports generate both an export
//! record and a synthetic import record, since they create a dependency
//! edge. Dynamic `import("...")` expressions are the one exception to the
//! top-level rule — they are collected tree-wide and flagged dynamic.

use tree_sitter::Node;

use super::{
    children, find_identifier, named_children, start_line, string_value, ExportKind, ExportRecord,
    ImportKind, ImportRecord, ImportSpecifier,
};
use crate::parser::ParsedSource;

/// Extract imports and exports from a parsed file.
pub fn extract_module_info(parsed: &ParsedSource) -> (Vec<ImportRecord>, Vec<ExportRecord>) {
    let mut imports = Vec::new();
    let mut exports = Vec::new();

    let root = parsed.tree.root_node();
    for node in named_children(root) {
        match node.kind() {
            "import_statement" => {
                if let Some(record) = import_record(node, parsed) {
                    imports.push(record);
                }
            }
            "export_statement" => extract_export(node, parsed, &mut imports, &mut exports),
            _ => {}
        }
    }

    collect_dynamic_imports(root, parsed, &mut imports);

    (imports, exports)
}

fn import_record(node: Node<'_>, parsed: &ParsedSource) -> Option<ImportRecord> {
    let source = node
        .child_by_field_name("source")
        .and_then(|n| string_value(n, parsed))?;

    let mut specifiers = Vec::new();
    if let Some(clause) = children(node).into_iter().find(|c| c.kind() == "import_clause") {
        for child in named_children(clause) {
            match child.kind() {
                // `import x from '...'`
                "identifier" => specifiers.push(ImportSpecifier {
                    local: parsed.node_text(child).to_string(),
                    imported: "default".to_string(),
                    kind: ImportKind::Default,
                }),
                // `import * as ns from '...'`
                "namespace_import" => {
                    if let Some(local) = find_identifier(child, parsed) {
                        specifiers.push(ImportSpecifier {
                            local,
                            imported: "*".to_string(),
                            kind: ImportKind::Namespace,
                        });
                    }
                }
                // `import { a, b as c } from '...'`
                "named_imports" => {
                    for spec in named_children(child) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let imported = parsed.node_text(name).to_string();
                        let local = spec
                            .child_by_field_name("alias")
                            .map(|a| parsed.node_text(a).to_string())
                            .unwrap_or_else(|| imported.clone());
                        specifiers.push(ImportSpecifier {
                            local,
                            imported,
                            kind: ImportKind::Named,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    Some(ImportRecord {
        source,
        specifiers,
        line: start_line(node),
        is_re_export: false,
        is_dynamic: false,
    })
}

fn extract_export(
    node: Node<'_>,
    parsed: &ParsedSource,
    imports: &mut Vec<ImportRecord>,
    exports: &mut Vec<ExportRecord>,
) {
    let line = start_line(node);
    let source = node
        .child_by_field_name("source")
        .and_then(|n| string_value(n, parsed));
    let parts = children(node);

    // `export * from '...'` / `export * as ns from '...'`
    if let Some(src) = &source {
        let namespace = parts.iter().find(|c| c.kind() == "namespace_export");
        if namespace.is_some() || parts.iter().any(|c| c.kind() == "*") {
            let name = namespace
                .and_then(|n| find_identifier(*n, parsed))
                .unwrap_or_else(|| "*".to_string());
            exports.push(ExportRecord {
                name,
                kind: ExportKind::ReExportAll,
                line,
                source: Some(src.clone()),
            });
            imports.push(ImportRecord {
                source: src.clone(),
                specifiers: Vec::new(),
                line,
                is_re_export: true,
                is_dynamic: false,
            });
            return;
        }
    }

    // `export { a, b as c }`, with or without a source
    if let Some(clause) = parts.iter().find(|c| c.kind() == "export_clause") {
        let mut synthetic = Vec::new();
        for spec in named_children(*clause) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let name = parsed.node_text(name_node).to_string();
            let exported = spec
                .child_by_field_name("alias")
                .map(|a| parsed.node_text(a).to_string())
                .unwrap_or_else(|| name.clone());

            exports.push(ExportRecord {
                name: exported,
                kind: if source.is_some() {
                    ExportKind::ReExport
                } else {
                    ExportKind::Const
                },
                line,
                source: source.clone(),
            });
            synthetic.push(ImportSpecifier {
                local: name.clone(),
                imported: name,
                kind: ImportKind::Named,
            });
        }

        if let Some(src) = &source {
            imports.push(ImportRecord {
                source: src.clone(),
                specifiers: synthetic,
                line,
                is_re_export: true,
                is_dynamic: false,
            });
        }
        return;
    }

    // `export default ...`
    if parts.iter().any(|c| c.kind() == "default") {
        let declaration = node
            .child_by_field_name("declaration")
            .or_else(|| node.child_by_field_name("value"));
        let kind = match declaration.map(|d| d.kind()) {
            Some("function_declaration") | Some("generator_function_declaration")
            | Some("arrow_function") => ExportKind::Function,
            Some("class_declaration") => ExportKind::Class,
            _ => ExportKind::Default,
        };
        let name = declaration
            .and_then(|d| d.child_by_field_name("name"))
            .map(|n| parsed.node_text(n).to_string())
            .unwrap_or_else(|| "default".to_string());
        exports.push(ExportRecord {
            name,
            kind,
            line,
            source: None,
        });
        return;
    }

    // `export function f() {}` / `export class C {}` / `export const x = ...`
    if let Some(decl) = node.child_by_field_name("declaration") {
        match decl.kind() {
            "function_declaration" | "generator_function_declaration" => {
                if let Some(name) = decl.child_by_field_name("name") {
                    exports.push(ExportRecord {
                        name: parsed.node_text(name).to_string(),
                        kind: ExportKind::Function,
                        line,
                        source: None,
                    });
                }
            }
            "class_declaration" => {
                if let Some(name) = decl.child_by_field_name("name") {
                    exports.push(ExportRecord {
                        name: parsed.node_text(name).to_string(),
                        kind: ExportKind::Class,
                        line,
                        source: None,
                    });
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                for declarator in named_children(decl) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let name = declarator
                        .child_by_field_name("name")
                        .filter(|n| n.kind() == "identifier")
                        .map(|n| parsed.node_text(n).to_string())
                        .unwrap_or_else(|| "[destructured]".to_string());
                    exports.push(ExportRecord {
                        name,
                        kind: classify_initializer(declarator.child_by_field_name("value")),
                        line,
                        source: None,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Classify a variable's exported kind by peeking at its initializer.
fn classify_initializer(init: Option<Node<'_>>) -> ExportKind {
    match init.map(|n| n.kind()) {
        Some("arrow_function") | Some("function_expression") | Some("function") => {
            ExportKind::Function
        }
        Some("class") => ExportKind::Class,
        _ => ExportKind::Const,
    }
}

/// Collect `import("literal")` call expressions anywhere in the tree.
fn collect_dynamic_imports(node: Node<'_>, parsed: &ParsedSource, imports: &mut Vec<ImportRecord>) {
    if node.kind() == "call_expression" {
        let callee = node.child_by_field_name("function");
        if callee.map(|c| c.kind()) == Some("import") {
            let source = node
                .child_by_field_name("arguments")
                .and_then(|args| named_children(args).into_iter().next())
                .and_then(|arg| string_value(arg, parsed));
            if let Some(source) = source {
                imports.push(ImportRecord {
                    source,
                    specifiers: Vec::new(),
                    line: start_line(node),
                    is_re_export: false,
                    is_dynamic: true,
                });
            }
        }
    }
    for child in named_children(node) {
        collect_dynamic_imports(child, parsed, imports);
    }
}

//! Per-file fact extraction.
//!
//! Three independent passes over one parsed tree — module info
//! (imports/exports), function/class inventory, call-site inventory — plus
//! the complexity/maintainability metrics pass. Each pass tolerates
//! unexpected tree shapes with defensive defaults: absent means
//! empty/none, never a panic.
//!
//! ```text
//! SourceFile ──parse──▶ tree ──▶ modules ─┐
//!                            ──▶ functions ├──▶ AnalyzedFile
//!                            ──▶ calls     │
//!                            ──▶ metrics  ─┘
//! ```

mod calls;
mod facts;
mod functions;
mod metrics;
mod modules;

pub use facts::{
    parent_dir, AnalyzedFile, CallKind, CallRecord, ClassRecord, ExportKind, ExportRecord,
    FileMetrics, FunctionComplexity, FunctionKind, FunctionRecord, ImportKind, ImportRecord,
    ImportSpecifier, MethodSummary,
};

use tree_sitter::Node;

use crate::parser::{self, Dialect, ParsedSource};
use crate::scan::SourceFile;

/// Analyze one source file into its fact record.
///
/// Pure computation over the in-memory source: no I/O, no shared state —
/// safe to fan out across worker threads. A parse failure degrades the
/// file to an empty-fact record instead of erroring.
pub fn analyze_file(file: &SourceFile) -> AnalyzedFile {
    let Some(dialect) = Dialect::from_extension(&file.extension) else {
        return AnalyzedFile::unparsed(file);
    };
    let Some(parsed) = parser::parse(&file.content, dialect) else {
        return AnalyzedFile::unparsed(file);
    };

    let (imports, exports) = modules::extract_module_info(&parsed);
    let (functions, classes) = functions::extract_functions(&parsed);
    let calls = calls::extract_calls(&parsed);
    let metrics = metrics::compute(&parsed, &file.content);

    AnalyzedFile {
        path: file.path.clone(),
        directory: parent_dir(&file.path),
        extension: file.extension.clone(),
        size: file.size,
        lines: file.lines,
        imports,
        exports,
        functions,
        classes,
        calls,
        metrics,
        parse_error: false,
    }
}

// Node helpers shared by the extraction passes. tree-sitter cursors borrow
// the node, so child iteration collects up front.

pub(crate) fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// 1-indexed start line (tree-sitter rows are 0-indexed).
pub(crate) fn start_line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

pub(crate) fn end_line(node: Node<'_>) -> usize {
    node.end_position().row + 1
}

/// Literal value of a string node, quotes removed. None for anything that
/// is not a plain string literal (template strings stay unresolved).
pub(crate) fn string_value(node: Node<'_>, parsed: &ParsedSource) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    Some(
        parsed
            .node_text(node)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string(),
    )
}

/// First identifier-like descendant, for shapes where the grammar nests
/// the name (namespace imports, heritage clauses).
pub(crate) fn find_identifier<'a>(node: Node<'a>, parsed: &ParsedSource) -> Option<String> {
    if matches!(node.kind(), "identifier" | "type_identifier") {
        return Some(parsed.node_text(node).to_string());
    }
    for child in named_children(node) {
        if let Some(name) = find_identifier(child, parsed) {
            return Some(name);
        }
    }
    None
}

#[cfg(test)]
pub(crate) fn parse_js(source: &str) -> ParsedSource {
    parser::parse(source, Dialect::JavaScript).expect("test source should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_file(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            extension: path.rsplit('.').next().unwrap_or("").to_string(),
            content: content.to_string(),
            size: content.len() as u64,
            lines: content.lines().count().max(1),
        }
    }

    #[test]
    fn test_analyze_file_collects_all_fact_kinds() {
        let file = source_file(
            "src/api/users.js",
            r#"
import { fetchJson } from '../utils/http.js';

export async function loadUsers() {
    if (cache) {
        return cache;
    }
    return fetchJson('/api/users');
}

export class UserStore {
    get size() { return this.users.length; }
}

let cache = null;
"#,
        );

        let analyzed = analyze_file(&file);
        assert!(!analyzed.parse_error);
        assert_eq!(analyzed.imports.len(), 1);
        assert_eq!(analyzed.exports.len(), 2);
        assert!(analyzed.functions.iter().any(|f| f.name == "loadUsers"));
        assert!(analyzed.classes.iter().any(|c| c.name == "UserStore"));
        assert!(analyzed.calls.iter().any(|c| c.callee == "fetchJson"));
        assert!(analyzed.metrics.complexity >= 2);
    }

    #[test]
    fn test_analyze_file_parse_error_empties_facts() {
        let file = source_file("src/broken.js", "function ((((");
        let analyzed = analyze_file(&file);
        assert!(analyzed.parse_error);
        assert!(analyzed.imports.is_empty());
        assert!(analyzed.exports.is_empty());
        assert!(analyzed.functions.is_empty());
        assert!(analyzed.classes.is_empty());
        assert!(analyzed.calls.is_empty());
    }

    #[test]
    fn test_analyze_file_unsupported_extension() {
        let file = source_file("README.md", "# not code");
        let analyzed = analyze_file(&file);
        assert!(analyzed.parse_error);
    }
}

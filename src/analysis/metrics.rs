//! Cyclomatic complexity, Halstead volume, and maintainability index.
//!
//! Complexity starts at 1 and counts decision points: if/ternary, loops,
//! non-default switch cases, catch clauses, and short-circuit/nullish
//! operators. Volume is a coarse token estimate over the raw source text,
//! not the tree. The maintainability index is the classic 171-based
//! formula rescaled to [0, 100].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use tree_sitter::Node;

use super::{named_children, start_line, FileMetrics, FunctionComplexity};
use crate::parser::ParsedSource;

/// Operator characters for the volume estimate.
static OPERATOR_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+\-*/%=<>!&|^~?:;,.{}()\[\]]").unwrap());

/// Word tokens stand in for operands.
static OPERAND_TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Compute all metrics for one parsed file.
///
/// `content` is the on-disk text (line counts and the volume estimate run
/// over what the author wrote, not the rewritten parse input).
pub fn compute(parsed: &ParsedSource, content: &str) -> FileMetrics {
    let root = parsed.tree.root_node();

    let complexity = 1 + count_decision_points(root, parsed);
    let function_complexity = function_complexities(root, parsed);

    let lines_of_code = content.lines().count();
    let lines_of_logic = count_logical_lines(content);
    let volume = estimate_volume(content);

    FileMetrics {
        complexity,
        maintainability: maintainability_index(volume, complexity, lines_of_code),
        function_complexity,
        lines_of_code,
        lines_of_logic,
    }
}

/// Count decision points in the subtree rooted at `node`.
fn count_decision_points(node: Node<'_>, parsed: &ParsedSource) -> u32 {
    let mut count = match node.kind() {
        "if_statement" | "ternary_expression" => 1,
        "for_statement" | "for_in_statement" | "for_of_statement" | "while_statement"
        | "do_statement" => 1,
        // switch_default is a distinct node kind, so default cases are
        // excluded for free
        "switch_case" => 1,
        "catch_clause" => 1,
        "binary_expression" => {
            let op = node
                .child_by_field_name("operator")
                .map(|o| parsed.node_text(o).to_string())
                .unwrap_or_default();
            if matches!(op.as_str(), "&&" | "||" | "??") {
                1
            } else {
                0
            }
        }
        _ => 0,
    };

    for child in named_children(node) {
        count += count_decision_points(child, parsed);
    }
    count
}

/// Per-function complexity entries, one per function-like node with a
/// block body. Expression-bodied arrows (one-expression callbacks) are
/// skipped.
fn function_complexities(root: Node<'_>, parsed: &ParsedSource) -> Vec<FunctionComplexity> {
    let mut out = Vec::new();
    walk_functions(root, parsed, &mut out);
    out
}

fn walk_functions(node: Node<'_>, parsed: &ParsedSource, out: &mut Vec<FunctionComplexity>) {
    let is_function_like = matches!(
        node.kind(),
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    );

    if is_function_like {
        if let Some(body) = node.child_by_field_name("body") {
            if body.kind() == "statement_block" {
                out.push(FunctionComplexity {
                    name: function_name(node, parsed),
                    complexity: 1 + count_decision_points(body, parsed),
                    line: start_line(node),
                });
            }
        }
    }

    for child in named_children(node) {
        walk_functions(child, parsed, out);
    }
}

/// Best-effort display name for a function-like node: its own name, the
/// variable it is bound to, or the property/method key holding it.
fn function_name(node: Node<'_>, parsed: &ParsedSource) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        if name.kind() != "computed_property_name" {
            return parsed.node_text(name).to_string();
        }
    }

    if let Some(parent) = node.parent() {
        match parent.kind() {
            "variable_declarator" => {
                if let Some(name) = parent
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                {
                    return parsed.node_text(name).to_string();
                }
            }
            "pair" => {
                if let Some(key) = parent
                    .child_by_field_name("key")
                    .filter(|k| k.kind() == "property_identifier")
                {
                    return parsed.node_text(key).to_string();
                }
            }
            _ => {}
        }
    }

    "<anonymous>".to_string()
}

/// Simplified Halstead volume from operator/operand token counts:
/// `(N1 + N2) * log2(n1 + n2)`, distinct counts floored at 1.
fn estimate_volume(content: &str) -> f64 {
    if content.is_empty() {
        return 1.0;
    }

    let operators: Vec<&str> = OPERATOR_TOKENS.find_iter(content).map(|m| m.as_str()).collect();
    let operands: Vec<&str> = OPERAND_TOKENS.find_iter(content).map(|m| m.as_str()).collect();

    let n1 = operators.iter().collect::<HashSet<_>>().len().max(1);
    let n2 = operands.iter().collect::<HashSet<_>>().len().max(1);
    let big_n1 = operators.len().max(1);
    let big_n2 = operands.len().max(1);

    let total = (big_n1 + big_n2) as f64;
    let distinct = (n1 + n2).max(2) as f64;
    total * distinct.log2()
}

/// Maintainability index rescaled to [0, 100], one decimal.
fn maintainability_index(volume: f64, complexity: u32, lines_of_code: usize) -> f64 {
    let volume = volume.max(1.0);
    let loc = lines_of_code.max(1) as f64;

    let mi = 171.0 - 5.2 * volume.ln() - 0.23 * complexity as f64 - 16.2 * loc.ln();
    let scaled = (mi * (100.0 / 171.0)).clamp(0.0, 100.0);
    (scaled * 10.0).round() / 10.0
}

/// Lines that are neither blank nor comments. Block-comment state is
/// tracked without nesting or string-literal awareness — a documented
/// heuristic.
fn count_logical_lines(content: &str) -> usize {
    let mut count = 0;
    let mut in_block_comment = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if in_block_comment {
            if trimmed.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }

        if trimmed.starts_with("/*") {
            if !trimmed.contains("*/") {
                in_block_comment = true;
            }
            continue;
        }

        if trimmed.starts_with("//") {
            continue;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse_js;

    fn metrics(source: &str) -> FileMetrics {
        compute(&parse_js(source), source)
    }

    #[test]
    fn test_complexity_if_and_loop() {
        // base 1 + if + && + for = 4
        let m = metrics(
            r#"
function check(items, flag) {
    if (flag && items) {
        for (const item of items) {
            use(item);
        }
    }
}
"#,
        );
        let f = &m.function_complexity[0];
        assert_eq!(f.name, "check");
        assert_eq!(f.complexity, 4);
    }

    #[test]
    fn test_default_switch_case_not_counted() {
        let m = metrics(
            r#"
function pick(x) {
    switch (x) {
        case 1: return 'a';
        case 2: return 'b';
        default: return 'c';
    }
}
"#,
        );
        // base 1 + two non-default cases = 3
        assert_eq!(m.function_complexity[0].complexity, 3);
    }

    #[test]
    fn test_catch_and_ternary_counted() {
        let m = metrics(
            r#"
function load(x) {
    try {
        return x ? parse(x) : null;
    } catch (e) {
        return null;
    }
}
"#,
        );
        // base 1 + ternary + catch = 3
        assert_eq!(m.function_complexity[0].complexity, 3);
    }

    #[test]
    fn test_expression_arrow_skipped_in_function_list() {
        let m = metrics("const double = (x) => x * 2;\nconst verbose = (x) => { return x; };");
        assert_eq!(m.function_complexity.len(), 1);
        assert_eq!(m.function_complexity[0].name, "verbose");
    }

    #[test]
    fn test_file_complexity_counts_everything() {
        let m = metrics("if (a) { b(); }\nconst x = c || d;");
        // base 1 + if + || = 3
        assert_eq!(m.complexity, 3);
    }

    #[test]
    fn test_maintainability_bounds() {
        let m = metrics("");
        assert!(m.maintainability >= 0.0 && m.maintainability <= 100.0);

        let big = "const value = compute(1) + compute(2);\n".repeat(500);
        let m = metrics(&big);
        assert!(m.maintainability >= 0.0 && m.maintainability <= 100.0);
    }

    #[test]
    fn test_logical_lines_skip_comments() {
        let content = r#"
// leading comment
const a = 1;

/* block
   comment */
const b = 2; /* trailing comment */
"#;
        // logical lines: `const a = 1;` and the `const b` line
        assert_eq!(count_logical_lines(content), 2);
    }

    #[test]
    fn test_volume_positive_for_degenerate_input() {
        assert!(estimate_volume("") >= 1.0);
        assert!(estimate_volume("x") > 0.0);
    }
}

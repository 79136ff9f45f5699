//! Function and class inventory.
//!
//! Collects function declarations, class declarations with their methods,
//! and arrow/function/class expressions bound to a variable (named after
//! the variable). Methods land both in their class record and in the flat
//! function list; a final pass deduplicates on `(name, start line)`,
//! keeping the first occurrence.

use std::collections::HashSet;

use tree_sitter::Node;

use super::{
    children, end_line, find_identifier, named_children, start_line, ClassRecord, FunctionKind,
    FunctionRecord, MethodSummary,
};
use crate::parser::ParsedSource;

/// Extract the function and class inventory from a parsed file.
pub fn extract_functions(parsed: &ParsedSource) -> (Vec<FunctionRecord>, Vec<ClassRecord>) {
    let mut functions = Vec::new();
    let mut classes = Vec::new();

    walk(parsed.tree.root_node(), parsed, &mut functions, &mut classes);

    // Class methods can be discovered by more than one path; keep the
    // first record for any (name, line) pair.
    let mut seen = HashSet::new();
    functions.retain(|f| seen.insert((f.name.clone(), f.line)));

    (functions, classes)
}

fn walk(
    node: Node<'_>,
    parsed: &ParsedSource,
    functions: &mut Vec<FunctionRecord>,
    classes: &mut Vec<ClassRecord>,
) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| parsed.node_text(n).to_string())
                .unwrap_or_else(|| "[anonymous]".to_string());
            functions.push(FunctionRecord {
                name,
                kind: FunctionKind::Function,
                class: None,
                is_async: has_token(node, "async"),
                is_generator: node.kind() == "generator_function_declaration",
                line: start_line(node),
                end_line: end_line(node),
                params: param_names(node, parsed),
            });
        }
        "class_declaration" => {
            let record = class_record(node, node, parsed, None);
            for method in &record.methods {
                functions.push(method_record(&record.name, method, node, parsed));
            }
            classes.push(record);
        }
        "variable_declarator" => {
            if let Some(value) = node.child_by_field_name("value") {
                let name = node
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| parsed.node_text(n).to_string());
                match value.kind() {
                    "arrow_function" | "function_expression" | "function"
                    | "generator_function" => {
                        functions.push(FunctionRecord {
                            name: name.unwrap_or_else(|| "[anonymous]".to_string()),
                            kind: if value.kind() == "arrow_function" {
                                FunctionKind::Arrow
                            } else {
                                FunctionKind::Function
                            },
                            class: None,
                            is_async: has_token(value, "async"),
                            is_generator: value.kind() == "generator_function"
                                || has_token(value, "*"),
                            line: start_line(node),
                            end_line: end_line(value),
                            params: param_names(value, parsed),
                        });
                    }
                    "class" => {
                        classes.push(class_record(value, node, parsed, name));
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }

    for child in named_children(node) {
        walk(child, parsed, functions, classes);
    }
}

/// Build a class record from a class declaration or expression.
///
/// `outer` carries the enclosing node whose start line the record uses
/// (the declarator for variable-bound class expressions); `binding` is the
/// variable name a class expression is assigned to.
fn class_record(
    class_node: Node<'_>,
    outer: Node<'_>,
    parsed: &ParsedSource,
    binding: Option<String>,
) -> ClassRecord {
    let name = binding
        .or_else(|| {
            class_node
                .child_by_field_name("name")
                .map(|n| parsed.node_text(n).to_string())
        })
        .unwrap_or_else(|| "[anonymous]".to_string());

    let superclass = children(class_node)
        .into_iter()
        .find(|c| c.kind() == "class_heritage")
        .and_then(|heritage| find_identifier(heritage, parsed));

    let mut methods = Vec::new();
    if let Some(body) = class_node.child_by_field_name("body") {
        for member in named_children(body) {
            if member.kind() != "method_definition" {
                continue;
            }
            methods.push(MethodSummary {
                name: method_name(member, parsed),
                kind: method_kind(member),
                is_static: has_token(member, "static"),
                is_async: has_token(member, "async"),
                line: start_line(member),
            });
        }
    }

    ClassRecord {
        name,
        superclass,
        line: start_line(outer),
        end_line: end_line(class_node),
        methods,
    }
}

/// Flat-list record for a class method.
fn method_record(
    class_name: &str,
    method: &MethodSummary,
    class_node: Node<'_>,
    parsed: &ParsedSource,
) -> FunctionRecord {
    // Relocate the method node to recover end line and parameters.
    let node = class_node
        .child_by_field_name("body")
        .map(named_children)
        .unwrap_or_default()
        .into_iter()
        .find(|m| m.kind() == "method_definition" && start_line(*m) == method.line);

    FunctionRecord {
        name: method.name.clone(),
        kind: method.kind,
        class: Some(class_name.to_string()),
        is_async: method.is_async,
        is_generator: node.map(|n| has_token(n, "*")).unwrap_or(false),
        line: method.line,
        end_line: node.map(end_line).unwrap_or(method.line),
        params: node.map(|n| param_names(n, parsed)).unwrap_or_default(),
    }
}

fn method_name(member: Node<'_>, parsed: &ParsedSource) -> String {
    match member.child_by_field_name("name") {
        Some(name) if name.kind() == "computed_property_name" => "[computed]".to_string(),
        Some(name) if name.kind() == "string" => parsed
            .node_text(name)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string(),
        Some(name) => parsed.node_text(name).to_string(),
        None => "[unknown]".to_string(),
    }
}

fn method_kind(member: Node<'_>) -> FunctionKind {
    if has_token(member, "get") {
        FunctionKind::Getter
    } else if has_token(member, "set") {
        FunctionKind::Setter
    } else {
        FunctionKind::Method
    }
}

/// Whether the node carries the given anonymous token among its direct
/// children (`async`, `static`, `get`, `set`, `*`).
fn has_token(node: Node<'_>, token: &str) -> bool {
    children(node)
        .into_iter()
        .any(|c| !c.is_named() && c.kind() == token)
}

/// Parameter names for a function-like node. Destructuring patterns
/// collapse to placeholders; defaults keep the bound name.
fn param_names(node: Node<'_>, parsed: &ParsedSource) -> Vec<String> {
    // Arrows with a single bare parameter use the `parameter` field.
    if let Some(single) = node.child_by_field_name("parameter") {
        return vec![parsed.node_text(single).to_string()];
    }
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };

    named_children(params)
        .into_iter()
        .map(|p| match p.kind() {
            "identifier" => parsed.node_text(p).to_string(),
            "assignment_pattern" => p
                .child_by_field_name("left")
                .filter(|l| l.kind() == "identifier")
                .map(|l| parsed.node_text(l).to_string())
                .unwrap_or_else(|| "?".to_string()),
            "rest_pattern" => named_children(p)
                .into_iter()
                .next()
                .filter(|inner| inner.kind() == "identifier")
                .map(|inner| format!("...{}", parsed.node_text(inner)))
                .unwrap_or_else(|| "?".to_string()),
            "object_pattern" => "{...}".to_string(),
            "array_pattern" => "[...]".to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse_js;

    fn inventory(source: &str) -> (Vec<FunctionRecord>, Vec<ClassRecord>) {
        let parsed = parse_js(source);
        extract_functions(&parsed)
    }

    #[test]
    fn test_function_declaration() {
        let (functions, _) = inventory("async function run(a, b = 1, ...rest) { return a; }");
        assert_eq!(functions.len(), 1);
        let f = &functions[0];
        assert_eq!(f.name, "run");
        assert_eq!(f.kind, FunctionKind::Function);
        assert!(f.is_async);
        assert!(!f.is_generator);
        assert_eq!(f.params, vec!["a", "b", "...rest"]);
    }

    #[test]
    fn test_generator_declaration() {
        let (functions, _) = inventory("function* walk() { yield 1; }");
        assert!(functions[0].is_generator);
    }

    #[test]
    fn test_variable_bound_arrow_named_after_variable() {
        let (functions, _) = inventory("const format = ({ value }) => String(value);");
        assert_eq!(functions[0].name, "format");
        assert_eq!(functions[0].kind, FunctionKind::Arrow);
        assert_eq!(functions[0].params, vec!["{...}"]);
    }

    #[test]
    fn test_class_with_methods() {
        let (functions, classes) = inventory(
            r#"
class OrderList extends Component {
    constructor(props) {}
    get total() { return 0; }
    static async fetch(id) {}
}
"#,
        );
        assert_eq!(classes.len(), 1);
        let cls = &classes[0];
        assert_eq!(cls.name, "OrderList");
        assert_eq!(cls.superclass.as_deref(), Some("Component"));
        assert_eq!(cls.methods.len(), 3);

        let total = cls.methods.iter().find(|m| m.name == "total").unwrap();
        assert_eq!(total.kind, FunctionKind::Getter);

        let fetch = cls.methods.iter().find(|m| m.name == "fetch").unwrap();
        assert!(fetch.is_static);
        assert!(fetch.is_async);

        // methods also land in the flat list, tagged with their class
        let flat = functions.iter().find(|f| f.name == "fetch").unwrap();
        assert_eq!(flat.class.as_deref(), Some("OrderList"));
        assert_eq!(flat.kind, FunctionKind::Method);
    }

    #[test]
    fn test_class_expression_named_after_variable() {
        let (_, classes) = inventory("const Store = class { read() {} };");
        assert_eq!(classes[0].name, "Store");
        assert_eq!(classes[0].methods.len(), 1);
    }

    #[test]
    fn test_dedup_on_name_and_line() {
        let (functions, _) = inventory("class A { run() {} }\nfunction run() {}");
        // Same name on different lines: both survive.
        assert_eq!(functions.iter().filter(|f| f.name == "run").count(), 2);
    }

    #[test]
    fn test_nested_functions_found() {
        let (functions, _) = inventory(
            "function outer() { const inner = () => {}; return inner; }",
        );
        assert!(functions.iter().any(|f| f.name == "outer"));
        assert!(functions.iter().any(|f| f.name == "inner"));
    }
}

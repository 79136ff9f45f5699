//! Fact records extracted from a single source file.
//!
//! Every record is anchored by a 1-indexed source line so downstream
//! consumers (graph builder, insight engines, report) can point back into
//! the file. All types serialize with camelCase keys to keep the JSON
//! report format stable.

use serde::{Deserialize, Serialize};

use crate::scan::SourceFile;

/// Kind of an imported name binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Default,
    Namespace,
    Named,
}

/// One name bound by an import declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// Name the binding gets in the importing file.
    pub local: String,
    /// Name as exported by the source module (`default` or `*` for the
    /// default/namespace forms).
    pub imported: String,
    #[serde(rename = "type")]
    pub kind: ImportKind,
}

/// An import declaration (or a synthetic one derived from a re-export).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    /// Raw specifier string as written in the source.
    pub source: String,
    /// Bound names. Empty means namespace/side-effect import — no specific
    /// names, everything from the target counts as used.
    pub specifiers: Vec<ImportSpecifier>,
    pub line: usize,
    /// True for the synthetic import a re-export generates (re-exports
    /// create dependency edges too).
    pub is_re_export: bool,
    /// True for `import("...")` call expressions with a literal specifier.
    pub is_dynamic: bool,
}

/// Kind of an exported binding, classified from its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "const")]
    Const,
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "reexport")]
    ReExport,
    #[serde(rename = "reexport-all")]
    ReExportAll,
}

/// A single exported name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExportKind,
    pub line: usize,
    /// Module the name is re-exported from, for reexport/reexport-all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Kind of a function-like definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Arrow,
    Method,
    Getter,
    Setter,
}

/// A function, method, or variable-bound function expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRecord {
    /// Declared or inferred name, `[anonymous]` when there is none.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    /// Owning class name for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(rename = "generator")]
    pub is_generator: bool,
    pub line: usize,
    pub end_line: usize,
    /// Parameter names; destructuring patterns collapse to `{...}`/`[...]`.
    pub params: Vec<String>,
}

/// Method summary attached to a class record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub line: usize,
}

/// A class declaration or variable-bound class expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    #[serde(rename = "extends", skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub line: usize,
    pub end_line: usize,
    pub methods: Vec<MethodSummary>,
}

/// How a call site's callee name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    /// Bare identifier call.
    Direct,
    /// Property-chain call, dot-joined display name.
    Member,
    /// Call on the result of another call — the name is approximate.
    Chained,
}

/// A call site with a best-effort resolved callee name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Qualified name of the enclosing function/method, None for
    /// top-level code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    pub callee: String,
    pub line: usize,
    #[serde(rename = "type")]
    pub kind: CallKind,
}

/// Cyclomatic complexity of one function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    pub name: String,
    pub complexity: u32,
    pub line: usize,
}

/// Per-file complexity and maintainability metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    /// File-level cyclomatic complexity (1 + decision points).
    pub complexity: u32,
    /// Maintainability index, rescaled to [0, 100].
    pub maintainability: f64,
    pub function_complexity: Vec<FunctionComplexity>,
    pub lines_of_code: usize,
    /// Lines excluding blanks and comments.
    pub lines_of_logic: usize,
}

impl Default for FileMetrics {
    fn default() -> Self {
        Self {
            complexity: 0,
            maintainability: 100.0,
            function_complexity: Vec::new(),
            lines_of_code: 0,
            lines_of_logic: 0,
        }
    }
}

/// All facts derived from one source file.
///
/// Derived exactly once per SourceFile and immutable afterwards. A parse
/// failure degrades the file to an empty-fact record — `parse_error`
/// implies every fact list is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedFile {
    /// Repo-relative forward-slash path, the file's unique key.
    pub path: String,
    pub directory: String,
    pub extension: String,
    pub size: u64,
    pub lines: usize,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
    pub functions: Vec<FunctionRecord>,
    pub classes: Vec<ClassRecord>,
    pub calls: Vec<CallRecord>,
    pub metrics: FileMetrics,
    pub parse_error: bool,
}

impl AnalyzedFile {
    /// Empty-fact record for a file that could not be parsed.
    pub fn unparsed(file: &SourceFile) -> Self {
        Self {
            path: file.path.clone(),
            directory: parent_dir(&file.path),
            extension: file.extension.clone(),
            size: file.size,
            lines: file.lines,
            imports: Vec::new(),
            exports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            calls: Vec::new(),
            metrics: FileMetrics {
                lines_of_code: file.lines,
                ..FileMetrics::default()
            },
            parse_error: true,
        }
    }
}

/// Directory portion of a repo-relative forward-slash path, `.` for
/// top-level files.
pub fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => ".".to_string(),
    }
}

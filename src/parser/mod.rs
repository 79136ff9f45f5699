//! Fault-tolerant parsing of JavaScript/TypeScript/Svelte sources.
//!
//! Parsing never errors outward. A file either yields a tree-sitter tree
//! with source positions on every node, or `None` — the caller degrades
//! the file to an empty-fact record.
//!
//! The pipeline per dialect:
//! - Svelte: extract embedded `<script>` blocks first (module-context
//!   blocks ahead of ordinary ones); nothing left means unparseable.
//! - TypeScript: strip type syntax with a lexical rewrite. This is
//!   textual, not syntactic — it can corrupt unusual but valid code, and
//!   downstream tolerates the resulting failures.
//! - All dialects: try an ordered list of grammar configurations, first
//!   clean parse wins.

mod strip;
mod svelte;

pub use strip::strip_type_annotations;
pub use svelte::extract_svelte_script;

use tree_sitter::{Language, Parser, Tree};

/// Source dialect, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
    Svelte,
}

impl Dialect {
    /// Map a file extension (without dot) to its dialect.
    pub fn from_extension(ext: &str) -> Option<Dialect> {
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Dialect::JavaScript),
            "ts" | "tsx" | "mts" => Some(Dialect::TypeScript),
            "svelte" => Some(Dialect::Svelte),
            _ => None,
        }
    }
}

/// A successfully parsed source: the tree plus the exact text it was
/// parsed from (which differs from the on-disk text for Svelte and
/// TypeScript inputs).
pub struct ParsedSource {
    pub tree: Tree,
    pub source: Vec<u8>,
    /// Name of the grammar configuration that produced the tree.
    pub strategy: &'static str,
}

impl ParsedSource {
    /// Parsed text as a string slice.
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    /// Text for a node of this tree.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// One parser configuration in the fallback chain.
struct ParseStrategy {
    name: &'static str,
    language: fn() -> Language,
}

/// Ordered configurations, most common syntax first. Later grammars accept
/// strictly more syntax (type annotations the lexical strip missed), which
/// stands in for acorn-style module/script mode fallback — tree-sitter has
/// no mode distinction.
const STRATEGIES: &[ParseStrategy] = &[
    ParseStrategy {
        name: "javascript",
        language: || tree_sitter_javascript::LANGUAGE.into(),
    },
    ParseStrategy {
        name: "typescript",
        language: || tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    },
    ParseStrategy {
        name: "tsx",
        language: || tree_sitter_typescript::LANGUAGE_TSX.into(),
    },
];

/// Parse source text for the given dialect.
///
/// Returns `None` when no configuration produces an error-free tree; the
/// file is then marked unparseable by the caller.
pub fn parse(text: &str, dialect: Dialect) -> Option<ParsedSource> {
    let code = match dialect {
        Dialect::Svelte => {
            let script = extract_svelte_script(text);
            if script.trim().is_empty() {
                return None;
            }
            script
        }
        Dialect::TypeScript => strip_type_annotations(text),
        Dialect::JavaScript => text.to_string(),
    };

    try_parse(&code)
}

/// Try each grammar configuration in order; the first clean parse wins.
fn try_parse(code: &str) -> Option<ParsedSource> {
    let source = code.as_bytes().to_vec();

    for strategy in STRATEGIES {
        let mut parser = Parser::new();
        if parser.set_language(&(strategy.language)()).is_err() {
            continue;
        }
        let Some(tree) = parser.parse(&source, None) else {
            continue;
        };
        if tree.root_node().has_error() {
            continue;
        }
        return Some(ParsedSource {
            tree,
            source,
            strategy: strategy.name,
        });
    }

    None
}

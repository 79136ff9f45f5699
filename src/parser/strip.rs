//! Lexical removal of TypeScript type syntax.
//!
//! Rewrites the common annotation shapes out of the text before parsing.
//! Intentionally rough: handles the common cases, not all edge cases.
//! Code it corrupts fails the JavaScript parse and falls through to the
//! TypeScript grammar strategies.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered (pattern, replacement) rewrites. Order matters: whole-statement
/// removals run before the annotation trims that would otherwise chew
/// into them.
static REWRITES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // import type { ... } from '...' / import type Foo from '...'
        (
            Regex::new(r#"import\s+type\s+\{[^}]*\}\s+from\s+['"][^'"]+['"]\s*;?"#).unwrap(),
            "",
        ),
        (
            Regex::new(r#"import\s+type\s+\w+\s+from\s+['"][^'"]+['"]\s*;?"#).unwrap(),
            "",
        ),
        // type Foo = ... declarations, exported or not
        (
            Regex::new(r"(?m)^type\s+\w+(?:<[^>]*>)?\s*=\s*[^;]+;").unwrap(),
            "",
        ),
        (
            Regex::new(r"(?m)^export\s+type\s+\w+(?:<[^>]*>)?\s*=\s*[^;]+;").unwrap(),
            "",
        ),
        // interface blocks (single-level bodies)
        (
            Regex::new(r"(?m)^(?:export\s+)?interface\s+\w+(?:<[^>]*>)?(?:\s+extends\s+[^{]+)?\s*\{[^}]*\}")
                .unwrap(),
            "",
        ),
        // return type annotations: `): Type {` / `): Type =>`
        (
            Regex::new(r"\)\s*:\s*\w+(?:<[^>]*>)?(?:\s*\[\s*\])?\s*(\{|=>)").unwrap(),
            ")${1}",
        ),
        // parameter annotations with named types: `foo: Type,`
        (
            Regex::new(r":\s*[A-Z]\w*(?:<[^>]*>)?(?:\s*\[\s*\])?(\s*[,)=;])").unwrap(),
            "${1}",
        ),
        // primitive annotations anywhere
        (
            Regex::new(
                r":\s*(?:string|number|boolean|void|any|never|unknown|null|undefined|object)\b(?:\s*\[\s*\])?",
            )
            .unwrap(),
            "",
        ),
        // `as Type` casts
        (Regex::new(r"\s+as\s+\w+(?:<[^>]*>)?").unwrap(), ""),
        // generic type arguments on calls with well-known type names
        (
            Regex::new(
                r"<(?:string|number|boolean|any|unknown|void|never|null|undefined|Record|Array|Promise|Map|Set|Partial|Required|Omit|Pick|Extract|Exclude)\b[^>]*>",
            )
            .unwrap(),
            "",
        ),
        // non-null assertions (but not !==)
        (Regex::new(r"(\w)!([.)\],;\s])").unwrap(), "${1}${2}"),
        // access modifiers and readonly
        (
            Regex::new(r"\b(?:private|protected|public|readonly)\s+").unwrap(),
            "",
        ),
        // declare statements
        (Regex::new(r"(?m)^declare\s+.+$").unwrap(), ""),
        // satisfies operator
        (
            Regex::new(r"\s+satisfies\s+\w+(?:<[^>]*>)?").unwrap(),
            "",
        ),
        // enum declarations have runtime semantics but are stripped anyway
        (
            Regex::new(r"(?m)^(?:export\s+)?(?:const\s+)?enum\s+\w+\s*\{[^}]*\}").unwrap(),
            "",
        ),
    ]
});

/// Strip TypeScript-specific syntax so the JavaScript grammar can parse
/// the result.
pub fn strip_type_annotations(content: &str) -> String {
    let mut code = content.to_string();
    for (pattern, replacement) in REWRITES.iter() {
        code = pattern.replace_all(&code, *replacement).into_owned();
    }
    code
}

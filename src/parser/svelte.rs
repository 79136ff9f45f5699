//! Embedded script extraction for Svelte components.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches any `<script ...>...</script>` block; attributes decide whether
/// it is a module-context block.
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script([^>]*)>(.*?)</script>").unwrap());

static MODULE_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"context\s*=\s*["']module["']"#).unwrap());

/// Pull the script text out of a Svelte component.
///
/// Module-context blocks come first so their imports/exports keep
/// top-level positions, then instance blocks. Returns an empty string when
/// the component has no script at all.
pub fn extract_svelte_script(content: &str) -> String {
    let mut module_blocks = Vec::new();
    let mut instance_blocks = Vec::new();

    for caps in SCRIPT_BLOCK.captures_iter(content) {
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        if MODULE_CONTEXT.is_match(attrs) {
            module_blocks.push(body);
        } else {
            instance_blocks.push(body);
        }
    }

    module_blocks
        .into_iter()
        .chain(instance_blocks)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_single_script() {
        let doc = "<script>\nlet count = 0;\n</script>\n<button>{count}</button>";
        let script = extract_svelte_script(doc);
        assert!(script.contains("let count = 0;"));
        assert!(!script.contains("<button>"));
    }

    #[test]
    fn test_module_block_comes_first() {
        let doc = concat!(
            "<script>\nlet local = 1;\n</script>\n",
            "<script context=\"module\">\nexport const shared = 2;\n</script>\n",
        );
        let script = extract_svelte_script(doc);
        let module_pos = script.find("shared").unwrap();
        let instance_pos = script.find("local").unwrap();
        assert!(module_pos < instance_pos);
    }

    #[test]
    fn test_no_script_yields_empty() {
        assert_eq!(extract_svelte_script("<div>markup only</div>"), "");
    }

    #[test]
    fn test_lang_attribute_is_not_module_context() {
        let doc = "<script lang=\"ts\">\nlet x = 1;\n</script>";
        let script = extract_svelte_script(doc);
        assert!(script.contains("let x = 1;"));
    }
}

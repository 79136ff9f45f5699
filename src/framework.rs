//! Framework detection heuristics.
//!
//! Decides whether a scanned tree is a SvelteKit project, a plain Svelte
//! project, or generic JavaScript, by looking for `svelte.config.*` and by
//! reading the nearest `package.json` (walking up a few levels — the scan
//! root is often a subdirectory like `src/`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scan::SourceFile;

const SVELTEKIT_CONFIGS: &[&str] = &["svelte.config.js", "svelte.config.ts"];

/// How far up to look for a package.json / svelte.config.
const PACKAGE_WALK_LIMIT: usize = 5;
const CONFIG_WALK_LIMIT: usize = 3;

/// Detected framework descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Framework {
    pub fn generic() -> Self {
        Self {
            name: "generic".to_string(),
            version: None,
        }
    }
}

/// Detect the framework for a scanned tree.
pub fn detect_framework(root: &Path, files: &[SourceFile]) -> Framework {
    let package = read_package_json(root);

    let is_sveltekit = has_sveltekit_config(files) || parent_dirs_have_config(root);
    if is_sveltekit {
        let version = package
            .as_ref()
            .and_then(|pkg| dependency_version(pkg, "@sveltejs/kit"));
        return Framework {
            name: "sveltekit".to_string(),
            version,
        };
    }

    if let Some(pkg) = &package {
        if let Some(version) = dependency_version(pkg, "svelte") {
            return Framework {
                name: "svelte".to_string(),
                version: Some(version),
            };
        }
    }

    Framework::generic()
}

fn has_sveltekit_config(files: &[SourceFile]) -> bool {
    files
        .iter()
        .any(|f| SVELTEKIT_CONFIGS.contains(&f.path.as_str()))
}

fn parent_dirs_have_config(root: &Path) -> bool {
    let mut dir: PathBuf = match root.parent() {
        Some(parent) => parent.to_path_buf(),
        None => return false,
    };

    for _ in 0..CONFIG_WALK_LIMIT {
        if SVELTEKIT_CONFIGS.iter().any(|cfg| dir.join(cfg).exists()) {
            return true;
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => break,
        }
    }
    false
}

fn read_package_json(root: &Path) -> Option<serde_json::Value> {
    let mut dir = root.to_path_buf();
    for _ in 0..PACKAGE_WALK_LIMIT {
        if let Ok(raw) = fs::read_to_string(dir.join("package.json")) {
            if let Ok(value) = serde_json::from_str(&raw) {
                return Some(value);
            }
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => break,
        }
    }
    None
}

/// Version string for a dependency, checking regular then dev
/// dependencies.
fn dependency_version(package: &serde_json::Value, name: &str) -> Option<String> {
    for table in ["dependencies", "devDependencies"] {
        if let Some(version) = package
            .get(table)
            .and_then(|deps| deps.get(name))
            .and_then(|v| v.as_str())
        {
            return Some(version.to_string());
        }
    }
    None
}

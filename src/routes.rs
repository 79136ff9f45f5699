//! SvelteKit file-based route extraction.
//!
//! Maps `+page`/`+server`/`+layout`/`+error` files under a `routes/`
//! directory to route descriptors: normalized path pattern, parameters,
//! exported HTTP methods, and `load`/`actions` flags.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scan::SourceFile;

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

static ROUTE_FILES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("+page.svelte", "page"),
        ("+page.server.js", "page"),
        ("+page.server.ts", "page"),
        ("+page.js", "page"),
        ("+page.ts", "page"),
        ("+server.js", "api"),
        ("+server.ts", "api"),
        ("+layout.svelte", "layout"),
        ("+layout.server.js", "layout"),
        ("+layout.server.ts", "layout"),
        ("+layout.js", "layout"),
        ("+layout.ts", "layout"),
        ("+error.svelte", "error"),
    ])
});

static ROUTES_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|/)routes/").unwrap());
static ROUTE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|.*/)routes/(.*?)/\+").unwrap());
static REST_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\.\.\.(\w+)\]").unwrap());
static NAMED_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\w+)\]").unwrap());
static GROUP_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\([^)]+\)").unwrap());
static PARAM_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:*](\w+)").unwrap());
static LOAD_EXPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"export\s+(?:const|let|function|async\s+function)\s+load\b").unwrap());
static ACTIONS_EXPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"export\s+const\s+actions\b").unwrap());

/// One file-based route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Normalized pattern, `[id]` as `:id` and `[...rest]` as `*rest`.
    pub path: String,
    /// Backing file.
    pub file: String,
    /// page, api, layout, or error.
    #[serde(rename = "type")]
    pub kind: String,
    /// Exported HTTP methods, api routes only.
    pub methods: Vec<String>,
    pub has_load: bool,
    pub has_actions: bool,
    pub params: Vec<String>,
}

/// Extract routes from the scanned files, sorted by path.
pub fn extract_routes(files: &[SourceFile]) -> Vec<Route> {
    let mut routes = Vec::new();

    for file in files {
        let file_name = file.path.rsplit('/').next().unwrap_or(&file.path);
        let Some(kind) = ROUTE_FILES.get(file_name) else {
            continue;
        };
        if !ROUTES_SEGMENT.is_match(&file.path) {
            continue;
        }

        let path = route_path(&file.path);
        let params = route_params(&path);

        let methods = if *kind == "api" {
            detect_http_methods(&file.content)
        } else {
            Vec::new()
        };

        let (has_load, has_actions) = if file_name.contains("server") {
            (
                LOAD_EXPORT.is_match(&file.content),
                ACTIONS_EXPORT.is_match(&file.content),
            )
        } else {
            (false, false)
        };

        routes.push(Route {
            path,
            file: file.path.clone(),
            kind: kind.to_string(),
            methods,
            has_load,
            has_actions,
            params,
        });
    }

    routes.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.file.cmp(&b.file)));
    routes
}

/// `routes/api/users/[id]/+server.js` becomes `/api/users/:id`.
fn route_path(file_path: &str) -> String {
    let Some(caps) = ROUTE_PREFIX.captures(file_path) else {
        return "/".to_string();
    };
    let mut route = format!("/{}", &caps[1]);

    route = REST_PARAM.replace_all(&route, "*$1").into_owned();
    route = NAMED_PARAM.replace_all(&route, ":$1").into_owned();
    // layout groups like (app) are invisible in the URL
    route = GROUP_SEGMENT.replace_all(&route, "").into_owned();

    if route.is_empty() {
        "/".to_string()
    } else {
        route
    }
}

fn route_params(route_path: &str) -> Vec<String> {
    PARAM_NAME
        .captures_iter(route_path)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn detect_http_methods(content: &str) -> Vec<String> {
    HTTP_METHODS
        .iter()
        .filter(|method| {
            let pattern = format!(
                r"export\s+(?:const|let|function|async\s+function)\s+{}\b",
                method
            );
            Regex::new(&pattern)
                .map(|re| re.is_match(content))
                .unwrap_or(false)
        })
        .map(|method| method.to_string())
        .collect()
}

//! Tests for the JSON report surface.
//!
//! The report format is consumed programmatically; key casing and
//! structural shape are part of the contract.

use std::path::PathBuf;

use modscope::{analyze, report, AnalyzeOptions};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("sample-project")
}

fn run_analysis() -> modscope::Report {
    analyze(&fixture_path(), &AnalyzeOptions::default()).expect("analysis should succeed")
}

#[test]
fn test_report_roundtrips_through_json() {
    let result = run_analysis();
    let json = report::to_json(&result).unwrap();
    let back: modscope::Report = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn test_report_keys_are_camel_case() {
    let result = run_analysis();
    let json = report::to_json(&result).unwrap();

    for key in [
        "\"generatedAt\"",
        "\"parseError\"",
        "\"isReExport\"",
        "\"deadExports\"",
        "\"totalFiles\"",
        "\"inDegree\"",
        "\"averageComplexity\"",
        "\"highCoupling\"",
    ] {
        assert!(json.contains(key), "missing key {}", key);
    }
    assert!(!json.contains("\"parse_error\""));
    assert!(!json.contains("\"is_re_export\""));
}

#[test]
fn test_report_shape() {
    let result = run_analysis();
    let json = report::to_json(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value["meta"]["name"].is_string());
    assert!(value["meta"]["framework"]["name"].is_string());
    assert!(value["files"].is_array());
    assert!(value["graph"]["nodes"].is_array());
    assert!(value["graph"]["edges"].is_array());
    assert!(value["routes"].is_array());
    assert!(value["insights"]["circular"].is_array());
    assert!(value["insights"]["complexity"]["hotspots"].is_array());
    assert!(value["insights"]["coupling"]["files"].is_array());
    assert!(value["stats"]["totalFiles"].is_u64());
}

#[test]
fn test_edge_and_export_kind_wire_names() {
    let result = run_analysis();
    let json = report::to_json(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let kinds: Vec<&str> = value["graph"]["edges"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["type"].as_str())
        .collect();
    assert!(kinds.iter().all(|k| matches!(*k, "import" | "dynamic" | "reexport")));
    assert!(kinds.contains(&"dynamic"));

    let export_kinds: Vec<&str> = value["files"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|f| f["exports"].as_array().unwrap().iter())
        .filter_map(|e| e["type"].as_str())
        .collect();
    assert!(export_kinds
        .iter()
        .all(|k| matches!(*k, "function" | "class" | "const" | "default" | "reexport" | "reexport-all")));
}

#[test]
fn test_write_json_creates_file() {
    let result = run_analysis();
    let dir = tempfile::TempDir::new().unwrap();
    let output = dir.path().join("report.json");

    report::write_json(&result, &output).unwrap();
    let raw = std::fs::read_to_string(&output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value["stats"]["totalFiles"].as_u64().unwrap() as usize,
        result.stats.total_files
    );
}

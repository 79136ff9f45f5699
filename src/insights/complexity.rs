//! Complexity findings and hotspot ranking.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalyzedFile, FunctionComplexity};

/// File complexity at or above this is reported.
pub const FILE_COMPLEXITY_THRESHOLD: u32 = 20;
/// Function complexity at or above this is reported.
pub const FUNCTION_COMPLEXITY_THRESHOLD: u32 = 10;
/// Hotspot list size.
const HOTSPOT_COUNT: usize = 10;
/// Hotspot scores below this floor are noise.
const HOTSPOT_SCORE_FLOOR: f64 = 0.5;

/// A file whose total complexity crossed the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexFile {
    pub file: String,
    pub complexity: u32,
    pub maintainability: f64,
    /// The over-threshold functions inside it.
    pub functions: Vec<FunctionComplexity>,
}

/// A single function over the function threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexFunction {
    pub file: String,
    pub function: String,
    pub complexity: u32,
    pub line: usize,
}

/// A file ranked by combined complexity, maintainability, and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub file: String,
    pub score: f64,
    pub reason: String,
}

/// All complexity findings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityInsights {
    pub complex_files: Vec<ComplexFile>,
    pub complex_functions: Vec<ComplexFunction>,
    pub hotspots: Vec<Hotspot>,
    pub average_complexity: f64,
}

/// Collect complexity findings across all analyzed files.
pub fn find_complexity_issues(files: &[AnalyzedFile]) -> ComplexityInsights {
    let mut complex_files = Vec::new();
    let mut complex_functions = Vec::new();
    let mut total_complexity: u64 = 0;
    let mut file_count: usize = 0;

    for file in files {
        if file.parse_error {
            continue;
        }
        let metrics = &file.metrics;
        file_count += 1;
        total_complexity += metrics.complexity as u64;

        let mut over_threshold = Vec::new();
        for function in &metrics.function_complexity {
            if function.complexity >= FUNCTION_COMPLEXITY_THRESHOLD {
                complex_functions.push(ComplexFunction {
                    file: file.path.clone(),
                    function: function.name.clone(),
                    complexity: function.complexity,
                    line: function.line,
                });
                over_threshold.push(function.clone());
            }
        }

        if metrics.complexity >= FILE_COMPLEXITY_THRESHOLD {
            complex_files.push(ComplexFile {
                file: file.path.clone(),
                complexity: metrics.complexity,
                maintainability: metrics.maintainability,
                functions: over_threshold,
            });
        }
    }

    complex_files.sort_by(|a, b| b.complexity.cmp(&a.complexity).then(a.file.cmp(&b.file)));
    complex_functions.sort_by(|a, b| {
        b.complexity
            .cmp(&a.complexity)
            .then(a.file.cmp(&b.file))
            .then(a.line.cmp(&b.line))
    });

    let average_complexity = if file_count > 0 {
        ((total_complexity as f64 / file_count as f64) * 10.0).round() / 10.0
    } else {
        0.0
    };

    ComplexityInsights {
        complex_files,
        complex_functions,
        hotspots: build_hotspots(files),
        average_complexity,
    }
}

/// Score every file and keep the worst offenders. Higher complexity and
/// lower maintainability both push the score up.
fn build_hotspots(files: &[AnalyzedFile]) -> Vec<Hotspot> {
    let mut scored = Vec::new();

    for file in files {
        if file.parse_error {
            continue;
        }
        let metrics = &file.metrics;

        let complexity_score = metrics.complexity as f64 / FILE_COMPLEXITY_THRESHOLD as f64;
        let maintainability_score = (100.0 - metrics.maintainability) / 50.0;
        let size_score = metrics.lines_of_code as f64 / 500.0;

        let score = complexity_score + maintainability_score + size_score;
        if score < HOTSPOT_SCORE_FLOOR {
            continue;
        }

        let mut reasons = Vec::new();
        if metrics.complexity >= FILE_COMPLEXITY_THRESHOLD {
            reasons.push(format!("complexity: {}", metrics.complexity));
        }
        if metrics.maintainability < 40.0 {
            reasons.push(format!("low maintainability: {}", metrics.maintainability));
        }
        if metrics.lines_of_code > 300 {
            reasons.push(format!("{} lines", metrics.lines_of_code));
        }

        scored.push(Hotspot {
            file: file.path.clone(),
            score: (score * 100.0).round() / 100.0,
            reason: if reasons.is_empty() {
                "accumulated complexity".to_string()
            } else {
                reasons.join(", ")
            },
        });
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });
    scored.truncate(HOTSPOT_COUNT);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{parent_dir, FileMetrics};

    fn file_with_metrics(path: &str, complexity: u32, maintainability: f64, loc: usize) -> AnalyzedFile {
        AnalyzedFile {
            path: path.to_string(),
            directory: parent_dir(path),
            extension: "js".to_string(),
            size: 0,
            lines: loc,
            imports: Vec::new(),
            exports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            calls: Vec::new(),
            metrics: FileMetrics {
                complexity,
                maintainability,
                function_complexity: vec![FunctionComplexity {
                    name: "worker".to_string(),
                    complexity,
                    line: 1,
                }],
                lines_of_code: loc,
                lines_of_logic: loc,
            },
            parse_error: false,
        }
    }

    #[test]
    fn test_thresholds() {
        let files = vec![
            file_with_metrics("src/simple.js", 3, 90.0, 40),
            file_with_metrics("src/tangled.js", 25, 35.0, 400),
        ];
        let insights = find_complexity_issues(&files);

        assert_eq!(insights.complex_files.len(), 1);
        assert_eq!(insights.complex_files[0].file, "src/tangled.js");
        assert_eq!(insights.complex_functions.len(), 1);
        assert_eq!(insights.average_complexity, 14.0);
    }

    #[test]
    fn test_hotspot_reasons() {
        let files = vec![file_with_metrics("src/tangled.js", 25, 35.0, 400)];
        let insights = find_complexity_issues(&files);

        assert_eq!(insights.hotspots.len(), 1);
        let hotspot = &insights.hotspots[0];
        assert!(hotspot.reason.contains("complexity: 25"));
        assert!(hotspot.reason.contains("low maintainability"));
        assert!(hotspot.reason.contains("400 lines"));
        // 25/20 + 65/50 + 400/500 = 1.25 + 1.3 + 0.8
        assert!((hotspot.score - 3.35).abs() < 1e-9);
    }

    #[test]
    fn test_low_scores_dropped() {
        let files = vec![file_with_metrics("src/tiny.js", 1, 95.0, 10)];
        let insights = find_complexity_issues(&files);
        assert!(insights.hotspots.is_empty());
    }

    #[test]
    fn test_parse_error_files_excluded_from_average() {
        let mut broken = file_with_metrics("src/broken.js", 0, 100.0, 10);
        broken.parse_error = true;
        let files = vec![broken, file_with_metrics("src/ok.js", 4, 80.0, 20)];
        let insights = find_complexity_issues(&files);
        assert_eq!(insights.average_complexity, 4.0);
    }
}

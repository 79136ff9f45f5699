//! Command-line interface for modscope.

use std::path::PathBuf;

use clap::Parser;
use colored::*;

use crate::{analyze, report, AnalyzeOptions};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Static analysis for JavaScript/TypeScript module trees.
///
/// Modscope scans a source tree, extracts imports/exports/functions/calls
/// per file, builds the dependency graph, and reports structural problems:
/// circular dependencies, dead exports, orphan files, complexity hotspots,
/// and coupling hubs.
#[derive(Parser)]
#[command(name = "modscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to analyze
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum directory depth to scan
    #[arg(long)]
    pub depth: Option<usize>,

    /// Skip framework detection and force a framework name
    #[arg(long)]
    pub framework: Option<String>,

    /// Include external package nodes in the graph
    #[arg(long)]
    pub include_external: bool,
}

/// Run the analysis command.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.format != "pretty" && cli.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            cli.format
        );
        return Ok(EXIT_ERROR);
    }

    let root = match cli.path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", cli.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let options = AnalyzeOptions {
        depth: cli.depth,
        framework: cli.framework.clone(),
        include_external: cli.include_external,
    };

    if cli.format == "pretty" {
        println!(
            "\n{}",
            format!("modscope v{}", env!("CARGO_PKG_VERSION")).bold()
        );
        println!("{} {}\n", "Scanning".dimmed(), root.display());
    }

    let result = analyze(&root, &options)?;

    if result.stats.total_files == 0 {
        eprintln!("Warning: no supported files found under {}", root.display());
        return Ok(EXIT_SUCCESS);
    }

    if cli.format == "pretty" {
        println!(
            "  {} {} files ({} functions)",
            "analyzed".green(),
            result.stats.total_files,
            result.stats.total_functions
        );
        if result.stats.parse_errors > 0 {
            println!(
                "  {} {} files failed to parse",
                "degraded".yellow(),
                result.stats.parse_errors
            );
        }
        println!("  {} {}", "framework".green(), result.meta.framework.name);
        if !result.routes.is_empty() {
            println!("  {} {}", "routes".green(), result.routes.len());
        }
        println!(
            "  {} {} nodes, {} edges",
            "graph".green(),
            result.graph.nodes.len(),
            result.graph.edges.len()
        );
    }

    match cli.format.as_str() {
        "json" => match &cli.output {
            Some(output) => {
                report::write_json(&result, output)?;
                eprintln!("report written to {}", output.display());
            }
            None => println!("{}", report::to_json(&result)?),
        },
        _ => {
            report::print_pretty(&result);
            if let Some(output) = &cli.output {
                report::write_json(&result, output)?;
                println!("\n  {} {}", "report".cyan(), output.display());
            }
        }
    }

    Ok(EXIT_SUCCESS)
}

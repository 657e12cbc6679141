//! Output formatting for scan results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: every `FileReport` plus failures, for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{BatchSummary, FileReport, SourceFile};
use crate::error::Result;

/// A file that produced no report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub path: String,
    pub error: String,
}

/// Reports and failures of one scan, in scan order.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub reports: Vec<FileReport>,
    pub failures: Vec<Failure>,
    pub summary: BatchSummary,
}

impl ScanResult {
    /// Pair batch outcomes with the files they came from.
    pub fn from_batch(files: &[SourceFile], results: Vec<Result<FileReport>>) -> Self {
        let summary = BatchSummary::from_results(&results);
        let mut scan = ScanResult {
            summary,
            ..Default::default()
        };
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(report) => scan.reports.push(report),
                Err(e) => scan.failures.push(Failure {
                    path: file.path().to_string(),
                    error: e.to_string(),
                }),
            }
        }
        scan
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn has_diagnostics(&self) -> bool {
        self.reports.iter().any(FileReport::has_diagnostics)
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub files_scanned: usize,
    pub summary: JsonSummary,
    pub files: Vec<FileReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
}

/// Totals over all scanned files.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    pub imports: usize,
    pub functions: usize,
    #[serde(default)]
    pub types: usize,
    #[serde(default)]
    pub comments: usize,
    #[serde(default)]
    pub strings: usize,
    pub diagnostics: usize,
    pub truncated: usize,
    pub failed: usize,
}

impl JsonReport {
    pub fn new(paths: &[String], config: Option<&str>, scan: &ScanResult) -> Self {
        let s = &scan.summary;
        JsonReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            paths: paths.to_vec(),
            config: config.map(str::to_string),
            files_scanned: s.files,
            summary: JsonSummary {
                imports: s.imports,
                functions: s.functions,
                types: s.types,
                comments: s.comments,
                strings: s.strings,
                diagnostics: s.diagnostics,
                truncated: s.truncated,
                failed: s.failed,
            },
            files: scan.reports.clone(),
            failures: scan.failures.clone(),
        }
    }
}

/// Write results in JSON format to stdout.
pub fn write_json(paths: &[String], config: Option<&str>, scan: &ScanResult) -> anyhow::Result<()> {
    let report = JsonReport::new(paths, config, scan);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format to stdout.
pub fn write_pretty(paths: &[String], config: Option<&str>, scan: &ScanResult, verbose: bool) {
    println!();
    print!("  ");
    print!("{}", "langscan".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", paths.join(", "));
    if let Some(config) = config {
        print!("  {}", "Config:   ".dimmed());
        println!("{}", config);
    }
    println!();

    for report in &scan.reports {
        write_file(report, verbose);
    }

    if !scan.failures.is_empty() {
        write_failures(&scan.failures);
        println!();
    }

    write_summary(&scan.summary);
    println!();
}

fn write_file(report: &FileReport, verbose: bool) {
    print!("  {}", report.path.blue());
    print!("  {}", format!("[{}]", report.language).dimmed());
    if report.truncated {
        print!("  {}", "truncated".yellow());
    }
    println!();

    if !report.imports.is_empty() {
        println!("    {} ({}):", "Imports".bold(), report.imports.len());
        for import in &report.imports {
            print!("      {}", import.module);
            if verbose {
                print!("{}", format!("  :{}", import.span.line).dimmed());
            }
            println!();
        }
    }

    if !report.functions.is_empty() {
        println!("    {} ({}):", "Functions".bold(), report.functions.len());
        for function in &report.functions {
            let params: Vec<String> = function
                .params
                .iter()
                .map(|p| match (p.name.is_empty(), p.type_name.is_empty()) {
                    (_, true) => p.name.clone(),
                    (true, false) => p.type_name.clone(),
                    (false, false) => format!("{} {}", p.name, p.type_name),
                })
                .collect();
            print!("      {}({})", function.qualified_name().green(), params.join(", "));
            if !function.results.is_empty() {
                print!(" {}", function.results.join(", "));
            }
            if function.returns_error_like {
                print!("  {}", "error-like".yellow());
            }
            if verbose {
                print!("{}", format!("  :{}", function.span.line).dimmed());
            }
            println!();
        }
    }

    if !report.types.is_empty() {
        println!("    {} ({}):", "Types".bold(), report.types.len());
        for decl in &report.types {
            let name = match &decl.owner {
                Some(owner) => format!("{}.{}", owner, decl.name),
                None => decl.name.clone(),
            };
            print!("      {} {}", decl.kind.dimmed(), name.green());
            if verbose {
                print!("{}", format!("  :{}", decl.span.line).dimmed());
            }
            println!();
        }
    }

    if verbose && !(report.comments.is_empty() && report.strings.is_empty()) {
        println!(
            "    {}",
            format!("{} comments, {} strings", report.comments.len(), report.strings.len()).dimmed()
        );
    }

    for diagnostic in &report.diagnostics {
        print!("    {} ", "WARN ".yellow());
        print!("{:<26}", diagnostic.kind.as_str().dimmed());
        print!("{}", format!(":{}", diagnostic.span.line).dimmed());
        println!("  {}", diagnostic.message);
    }
    println!();
}

fn write_failures(failures: &[Failure]) {
    println!("  {} ({}):", "Failed".red().bold(), failures.len());
    for failure in failures {
        print!("    {} ", "ERROR".red());
        print!("{}", failure.path.blue());
        println!("  {}", failure.error);
    }
}

fn write_summary(summary: &BatchSummary) {
    let plural = |n: usize| if n != 1 { "s" } else { "" };
    print!(
        "  {} file{}, {} import{}, {} function{}",
        summary.files,
        plural(summary.files),
        summary.imports,
        plural(summary.imports),
        summary.functions,
        plural(summary.functions),
    );
    if summary.types > 0 {
        print!(", {} type{}", summary.types, plural(summary.types));
    }
    if summary.diagnostics > 0 {
        print!(
            ", {}",
            format!("{} diagnostic{}", summary.diagnostics, plural(summary.diagnostics)).yellow()
        );
    }
    if summary.failed > 0 {
        print!(", {}", format!("{} failed", summary.failed).red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_batch, Analyzer};

    fn scan() -> (Vec<SourceFile>, ScanResult) {
        let files = vec![
            SourceFile::new(
                "main.go",
                "go",
                "package main\n\nimport \"fmt\"\n\n// Config holds flags.\ntype Config struct{}\n\nfunc main() {}\n",
            ),
            SourceFile::new("notes.txt", "text", "import nothing"),
        ];
        let results = analyze_batch(&Analyzer::default(), &files);
        let scan = ScanResult::from_batch(&files, results);
        (files, scan)
    }

    #[test]
    fn test_scan_result_splits_failures() {
        let (_, scan) = scan();
        assert_eq!(scan.reports.len(), 1);
        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].path, "notes.txt");
        assert_eq!(
            scan.failures[0].error,
            "no grammar registered for language 'text'"
        );
        assert!(scan.has_failures());
        assert!(!scan.has_diagnostics());
    }

    #[test]
    fn test_json_report_fields() {
        let (_, scan) = scan();
        let report = JsonReport::new(&[".".to_string()], None, &scan);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["files_scanned"], 2);
        assert_eq!(value["summary"]["imports"], 1);
        assert_eq!(value["summary"]["functions"], 1);
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["summary"]["types"], 1);
        assert_eq!(value["summary"]["comments"], 1);
        assert_eq!(value["summary"]["strings"], 1);
        assert_eq!(value["files"][0]["types"][0]["name"], "Config");
        assert_eq!(value["files"][0]["types"][0]["kind"], "struct");
        assert_eq!(value["files"][0]["comments"][0]["text"], "// Config holds flags.");
        assert_eq!(value["files"][0]["imports"][0]["module"], "fmt");
        assert_eq!(value["files"][0]["functions"][0]["name"], "main");
        assert_eq!(value["failures"][0]["path"], "notes.txt");
        assert!(value.get("config").is_none());
    }
}

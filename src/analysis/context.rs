//! Batch analysis.
//!
//! Files are independent, so a batch is analyzed in parallel with rayon.
//! Outcomes come back in input order, one per file.

use rayon::prelude::*;
use tracing::debug;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::facts::{FileReport, SourceFile};
use crate::error::Result;

/// Analyze `files` in parallel.
///
/// A failing file yields an `Err` in its slot; the other files are
/// unaffected.
pub fn analyze_batch(analyzer: &Analyzer, files: &[SourceFile]) -> Vec<Result<FileReport>> {
    let results: Vec<_> = files.par_iter().map(|f| analyzer.analyze(f)).collect();
    debug!(
        files = files.len(),
        failed = results.iter().filter(|r| r.is_err()).count(),
        "batch analyzed"
    );
    results
}

/// Summary counts over a batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub failed: usize,
    pub imports: usize,
    pub functions: usize,
    pub types: usize,
    pub comments: usize,
    pub strings: usize,
    pub diagnostics: usize,
    pub truncated: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[Result<FileReport>]) -> Self {
        let mut summary = BatchSummary {
            files: results.len(),
            ..Default::default()
        };
        for result in results {
            match result {
                Ok(report) => {
                    summary.imports += report.imports.len();
                    summary.functions += report.functions.len();
                    summary.types += report.types.len();
                    summary.comments += report.comments.len();
                    summary.strings += report.strings.len();
                    summary.diagnostics += report.diagnostics.len();
                    if report.truncated {
                        summary.truncated += 1;
                    }
                }
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

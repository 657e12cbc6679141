//! Language dispatch: grammar lookup, tokenizing and both extractors.

use tracing::{debug, warn};

use crate::analysis::facts::{FileReport, SourceFile};
use crate::analysis::functions::extract_functions;
use crate::analysis::imports::extract_imports;
use crate::analysis::literals::{extract_comments, extract_strings};
use crate::analysis::scope::extract_types;
use crate::error::{Result, ScanError};
use crate::parser::{builtin_registry, tokenize, GrammarRegistry};

/// Runs the extraction pipeline against a grammar registry.
///
/// The registry is only read, so one analyzer can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'r> {
    registry: &'r GrammarRegistry,
}

impl<'r> Analyzer<'r> {
    pub fn new(registry: &'r GrammarRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r GrammarRegistry {
        self.registry
    }

    /// Analyze one file.
    ///
    /// Fails only for unknown languages and invalid UTF-8; malformed
    /// statements are reported as diagnostics on the returned report.
    pub fn analyze(&self, file: &SourceFile) -> Result<FileReport> {
        let grammar = self
            .registry
            .get(file.language())
            .ok_or_else(|| ScanError::UnsupportedLanguage(file.language().to_string()))?;

        let stream = tokenize(file.content(), &grammar)?;
        let imports = extract_imports(&stream, &grammar);
        let functions = extract_functions(&stream, &grammar);
        let types = extract_types(&stream, &grammar);

        let mut diagnostics = imports.diagnostics;
        diagnostics.extend(functions.diagnostics);

        if stream.truncated() {
            warn!(path = file.path(), "unterminated comment or string literal; rest of file skipped");
        }
        for diagnostic in &diagnostics {
            warn!(
                path = file.path(),
                kind = %diagnostic.kind,
                line = diagnostic.span.line,
                "{}",
                diagnostic.message
            );
        }
        debug!(
            path = file.path(),
            language = %grammar.language,
            tokens = stream.len(),
            imports = imports.items.len(),
            functions = functions.items.len(),
            types = types.len(),
            "analyzed file"
        );

        Ok(FileReport {
            path: file.path().to_string(),
            language: grammar.language.clone(),
            imports: imports.items,
            functions: functions.items,
            types,
            comments: extract_comments(&stream),
            strings: extract_strings(&stream),
            diagnostics,
            truncated: stream.truncated(),
        })
    }
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self::new(builtin_registry())
    }
}

/// Analyze one file with the built-in grammars.
pub fn analyze(file: &SourceFile) -> Result<FileReport> {
    Analyzer::default().analyze(file)
}

//! langscan - multi-language import and function signature extraction.
//!
//! langscan reads source files in Go, Java, C, C++, C#, JavaScript, Python,
//! Ruby, R, shell and Visual Basic and reports, per file, the modules it
//! imports and the signatures of the functions it declares, along with its
//! type declarations, comments and string literals. Function bodies are
//! never interpreted.
//!
//! # Architecture
//!
//! - `parser`: data-only grammars, the grammar-driven lexer and the registry
//! - `analysis`: import and function extractors over the token stream
//! - `config`: `langscan.yaml` schema and registry construction
//! - `report`: output formatting (pretty, JSON)
//! - `cli`: the `langscan` command line
//!
//! # Example
//!
//! ```
//! use langscan::{analyze, SourceFile};
//!
//! let file = SourceFile::new("main.go", "go", "package main\n\nimport \"fmt\"\n\nfunc main() {}\n");
//! let report = analyze(&file).unwrap();
//! assert_eq!(report.modules().collect::<Vec<_>>(), vec!["fmt"]);
//! assert_eq!(report.functions[0].name, "main");
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod report;

pub use analysis::{
    analyze, analyze_batch, extract_comments, extract_functions, extract_imports,
    extract_strings, extract_types, Analyzer, BatchSummary, Diagnostic, DiagnosticKind,
    FileReport, FunctionSignature, ImportRecord, Parameter, SourceFile, Span, TextRecord,
    TypeDeclaration,
};
pub use config::Config;
pub use error::{Result, ScanError};
pub use parser::{builtin_registry, tokenize, Grammar, GrammarError, GrammarRegistry};

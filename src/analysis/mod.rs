//! Import and function extraction.
//!
//! Both extractors run over the same comment-free token stream and never
//! look inside function bodies beyond what is needed to skip them. Type
//! declarations come from the same scope pass that assigns method owners;
//! comments and string literals are copied straight from the lexer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────┐    ┌─────────────┐    ┌────────────┐
//! │ SourceFile  │───▶│ Lexer   │───▶│ TokenStream │───▶│ imports    │──┐
//! └─────────────┘    │(grammar)│    └─────────────┘    ├────────────┤  │
//!                    └─────────┘           │           │ functions  │──┤
//!                                          └──────────▶│ (scope,    │  │
//!                                                      │  params)   │  │
//!                                                      └────────────┘  ▼
//!                                                               ┌────────────┐
//!                                                               │ FileReport │
//!                                                               └────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! Languages are data: add a `Grammar` constructor in `parser::languages`
//! and list it in `languages::all()`, or load one from `langscan.yaml`.

mod analyzer;
mod context;
mod facts;
mod functions;
mod imports;
mod literals;
mod params;
mod scope;
mod tokens;

pub use analyzer::{analyze, Analyzer};
pub use context::{analyze_batch, BatchSummary};
pub use facts::{
    Diagnostic, DiagnosticKind, Extraction, FileReport, FunctionSignature, ImportRecord,
    Parameter, SourceFile, Span, TextRecord, TypeDeclaration,
};
pub use functions::extract_functions;
pub use imports::extract_imports;
pub use literals::{extract_comments, extract_strings};
pub use scope::extract_types;

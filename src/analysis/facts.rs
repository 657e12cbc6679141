//! Fact structures produced by the extraction engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end: usize,
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column in characters (1-indexed).
    pub column: usize,
    /// End line (1-indexed).
    pub end_line: usize,
}

impl Span {
    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
            end_line: other.end_line.max(self.end_line),
        }
    }

    /// Whether `offset` falls inside this span.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A file handed to the engine by its caller.
///
/// The engine never opens files; the content is already loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: String,
    language: String,
    content: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, language: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared language tag (e.g. "go", "python").
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// A module or package imported by a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// The imported module identifier (path of record, never the alias).
    pub module: String,
    /// Span of the import statement that introduced it.
    pub span: Span,
}

/// A declared parameter. Either field may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Signature of a declared function or method, taken from its header only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    /// Receiver type (Go) or enclosing type; `None` for free functions.
    pub owner: Option<String>,
    pub params: Vec<Parameter>,
    /// Declared result types, in order.
    pub results: Vec<String>,
    /// Whether the last result type satisfies the grammar's error predicate.
    pub returns_error_like: bool,
    /// Span of the declaration header.
    pub span: Span,
}

impl FunctionSignature {
    /// `Owner.name` for methods, `name` for free functions.
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// A comment or string literal as written, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
    pub span: Span,
}

/// A named type whose body is declared in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    /// Declaring keyword (`class`, `struct`, `interface`, ...).
    pub kind: String,
    /// Enclosing type for nested declarations.
    pub owner: Option<String>,
    /// Span from the keyword to the name.
    pub span: Span,
}

/// Kind of non-fatal problem found while extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedImport,
    MalformedFunctionHeader,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedImport => "malformed_import",
            DiagnosticKind::MalformedFunctionHeader => "malformed_function_header",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A non-fatal problem attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn malformed_import(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MalformedImport,
            message: message.into(),
            span,
        }
    }

    pub fn malformed_function_header(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MalformedFunctionHeader,
            message: message.into(),
            span,
        }
    }
}

impl From<&Diagnostic> for ScanError {
    fn from(d: &Diagnostic) -> Self {
        match d.kind {
            DiagnosticKind::MalformedImport => ScanError::MalformedImport {
                line: d.span.line,
                message: d.message.clone(),
            },
            DiagnosticKind::MalformedFunctionHeader => ScanError::MalformedFunctionHeader {
                line: d.span.line,
                message: d.message.clone(),
            },
        }
    }
}

/// Output of one extractor pass: items plus the diagnostics raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// Complete extraction result for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub language: String,
    pub imports: Vec<ImportRecord>,
    pub functions: Vec<FunctionSignature>,
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    #[serde(default)]
    pub comments: Vec<TextRecord>,
    #[serde(default)]
    pub strings: Vec<TextRecord>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// An unterminated comment or string swallowed the rest of the file.
    #[serde(default)]
    pub truncated: bool,
}

impl FileReport {
    /// Module identifiers in report order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(|i| i.module.as_str())
    }

    /// Find the first function with the given name.
    pub fn find_function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Functions bound to an owner type.
    pub fn methods_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a FunctionSignature> {
        self.functions
            .iter()
            .filter(move |f| f.owner.as_deref() == Some(owner))
    }

    /// Find the first type declaration with the given name.
    pub fn find_type(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

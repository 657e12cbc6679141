//! Grammar descriptors: plain configuration records describing how a
//! language spells comments, strings, imports and function headers.
//!
//! Adding a language means building one more [`Grammar`] value (in
//! `parser::languages` or in a YAML config file), never a new type.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::FunctionSignature;

/// Problems found when registering a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar has an empty language tag")]
    EmptyLanguage,
    #[error("language tag or alias '{0}' is already registered")]
    Duplicate(String),
    #[error("grammar '{0}' uses keyword-style headers but lists no function keywords")]
    MissingFunctionKeywords(String),
    #[error("grammar '{language}' has an empty {what}")]
    EmptyDelimiter { language: String, what: &'static str },
    #[error("no grammar registered for language '{0}'")]
    UnknownLanguage(String),
}

/// An open/close delimiter pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
    /// Only recognised when `open` is the first non-blank text on its line.
    #[serde(default)]
    pub line_start: bool,
}

impl Delimiters {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            line_start: false,
        }
    }

    pub fn at_line_start(open: &str, close: &str) -> Self {
        Self {
            line_start: true,
            ..Self::new(open, close)
        }
    }
}

/// How a string or character literal is delimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRule {
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub escape: Option<char>,
    /// A doubled close delimiter is an escaped delimiter (`""` in VB).
    #[serde(default)]
    pub doubled_close: bool,
}

impl StringRule {
    /// Single-line literal with backslash escapes.
    pub fn escaped(quote: &str) -> Self {
        Self {
            open: quote.to_string(),
            close: quote.to_string(),
            escape: Some('\\'),
            doubled_close: false,
        }
    }

    /// Literal without escapes.
    pub fn raw(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            escape: None,
            doubled_close: false,
        }
    }

    pub fn doubled(mut self) -> Self {
        self.doubled_close = true;
        self
    }
}

/// Token-level rules used by the lexer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalRules {
    #[serde(default)]
    pub line_comments: Vec<String>,
    /// Line comment markers only count at the start of a word (`#` in shell).
    #[serde(default)]
    pub line_comment_word_start: bool,
    #[serde(default)]
    pub block_comments: Vec<Delimiters>,
    #[serde(default)]
    pub strings: Vec<StringRule>,
    /// Character that starts a preprocessor directive line.
    #[serde(default)]
    pub directive_prefix: Option<char>,
    /// Recognise `/regex/flags` literals where an expression may start.
    #[serde(default)]
    pub regex_literals: bool,
    /// Multi-character operators, matched longest first.
    #[serde(default)]
    pub operators: Vec<String>,
    /// Extra characters allowed inside identifiers (e.g. `$`).
    #[serde(default)]
    pub identifier_chars: String,
    /// Characters allowed once at the end of an identifier (e.g. `?!`).
    #[serde(default)]
    pub identifier_suffixes: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub case_insensitive: bool,
}

/// Where a path-style import ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    #[default]
    Semicolon,
    LineEnd,
    /// A keyword ends the path (`from x import y`); the rest of the
    /// statement is consumed.
    Keyword(String),
}

/// Options for dotted-path imports (`import a.b.C;`, `using A.B;`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathImport {
    /// Segment separator (`.`, `::`).
    pub separator: String,
    /// Written `line_end` or `{ keyword: import }` in YAML.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub terminator: Terminator,
    /// Separator between several paths in one statement.
    #[serde(default)]
    pub list_separator: Option<String>,
    /// Words skipped right after the keyword (`static`).
    #[serde(default)]
    pub skip_words: Vec<String>,
    /// `Alias = Some.Path`: the path after this operator is kept.
    #[serde(default)]
    pub alias_prefix: Option<String>,
    /// `some.path as alias`: the alias after this word is dropped.
    #[serde(default)]
    pub alias_suffix: Option<String>,
    /// When the keyword is followed by one of these, it is not an import.
    #[serde(default)]
    pub reject_next: Vec<String>,
    /// Leading separators denote relative imports (`from . import x`).
    #[serde(default)]
    pub relative: bool,
}

/// Options for call-style imports (`require("x")`, `library(x)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallImport {
    /// The argument may follow the keyword without parentheses.
    #[serde(default)]
    pub parens_optional: bool,
    /// Only string literals are accepted as the module argument.
    #[serde(default)]
    pub literal_only: bool,
}

/// Syntactic shape of an import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ImportShape {
    /// Keyword, optional alias, string literal, or a grouped list of them.
    Quoted {
        #[serde(default)]
        group: Option<Delimiters>,
    },
    Path(PathImport),
    /// `import x from "m"` / `import "m"` / `import("m")`.
    From { clause: String },
    Call(CallImport),
    /// `#include <m>` directive lines.
    Include,
}

/// One import form: a keyword plus the shape that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportForm {
    pub keyword: String,
    #[serde(flatten)]
    pub shape: ImportShape,
}

impl ImportForm {
    pub fn new(keyword: &str, shape: ImportShape) -> Self {
        Self {
            keyword: keyword.to_string(),
            shape,
        }
    }
}

/// How function headers are introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    /// A keyword starts the header (`func`, `def`, `function`).
    Keyword,
    /// `[modifiers] type name(params)` as in the C family.
    TypePrefixed,
}

/// How one parameter is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// `a, b int` (Go).
    NameThenType,
    /// `int a` (C family).
    TypeThenName,
    /// `a: int` (Python).
    NameColonType,
    /// `a` (JavaScript, Ruby, R, shell).
    NameOnly,
    /// `ByVal a As Integer` (VB); uses `FunctionRules::type_keyword`.
    NameAsType,
}

/// How result types are spelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStyle {
    /// After the parameter list: `int`, `(int, error)`, `(err error)`.
    Trailing,
    /// After an arrow token: `-> int`.
    Arrow { token: String },
    /// Before the name: `int main(...)`.
    Prefix,
    /// After `FunctionRules::type_keyword`: `As Integer`.
    AsClause,
    None,
}

/// How type scopes (classes, modules) are delimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    #[default]
    Braces,
    Indentation,
}

/// Definitions written without the function keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BareDefinitions {
    #[default]
    Never,
    /// `name() {` at the start of a line (shell).
    LineStart,
    /// `name(args) {` directly inside a type body (JavaScript classes).
    TypeScope,
}

/// Function header rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRules {
    pub style: HeaderStyle,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// A parenthesised receiver may precede the name (Go).
    #[serde(default)]
    pub receiver: bool,
    /// Separators that qualify a name with its owner (`::`, `.`).
    #[serde(default)]
    pub qualifiers: Vec<String>,
    /// Type parameter brackets that may follow the name.
    #[serde(default)]
    pub type_parameters: Option<Delimiters>,
    pub params: ParamStyle,
    /// The parameter list may be written without parentheses.
    #[serde(default)]
    pub params_optional: bool,
    pub results: ResultStyle,
    /// Keyword introducing a type annotation (`As`).
    #[serde(default)]
    pub type_keyword: Option<String>,
    /// Angle brackets nest inside parameter lists and return types.
    #[serde(default)]
    pub generics: bool,
    #[serde(default)]
    pub block: BlockStyle,
    /// Keywords that open a named type scope (`class`, `struct`).
    #[serde(default)]
    pub type_keywords: Vec<String>,
    /// Words stripped from return types and parameter types.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Names that are never functions (`if`, `while`, `sizeof`).
    #[serde(default)]
    pub excluded_names: Vec<String>,
    /// Words whose presence before a header means it is not a declaration.
    #[serde(default)]
    pub excluded_predecessors: Vec<String>,
    /// `name <- function(...)`: anonymous functions bound by these operators
    /// take the bound name.
    #[serde(default)]
    pub assignment_operators: Vec<String>,
    #[serde(default)]
    pub bare_definitions: BareDefinitions,
    /// Operator method names (`def ==(other)`).
    #[serde(default)]
    pub operator_names: bool,
    /// Keyword naming operator overloads in type-prefixed headers
    /// (`operator==`, `operator bool`).
    #[serde(default)]
    pub operator_keyword: Option<String>,
    /// Marker of a result type written after the parameter list (`-> int`).
    #[serde(default)]
    pub trailing_result: Option<String>,
}

impl FunctionRules {
    /// Rules for a keyword-led header with no extras.
    pub fn keyword(keywords: &[&str], params: ParamStyle, results: ResultStyle) -> Self {
        Self {
            style: HeaderStyle::Keyword,
            keywords: words(keywords),
            receiver: false,
            qualifiers: Vec::new(),
            type_parameters: None,
            params,
            params_optional: false,
            results,
            type_keyword: None,
            generics: false,
            block: BlockStyle::Braces,
            type_keywords: Vec::new(),
            modifiers: Vec::new(),
            excluded_names: Vec::new(),
            excluded_predecessors: Vec::new(),
            assignment_operators: Vec::new(),
            bare_definitions: BareDefinitions::Never,
            operator_names: false,
            operator_keyword: None,
            trailing_result: None,
        }
    }

    /// Rules for C-family headers.
    pub fn type_prefixed() -> Self {
        Self {
            style: HeaderStyle::TypePrefixed,
            ..Self::keyword(&[], ParamStyle::TypeThenName, ResultStyle::Prefix)
        }
    }
}

/// Shape of a method that makes its owner error-like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodShape {
    pub name: String,
    #[serde(default)]
    pub params: usize,
    /// Accepted types for the single result.
    pub result_types: Vec<String>,
}

impl MethodShape {
    /// Whether a signature has exactly this shape.
    pub fn matches(&self, sig: &FunctionSignature) -> bool {
        sig.name == self.name
            && sig.params.len() == self.params
            && sig.results.len() == 1
            && self
                .result_types
                .iter()
                .any(|t| normalize_type(&sig.results[0]) == t.as_str())
    }
}

/// Rule deciding whether a type counts as error-like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPredicate {
    #[serde(default)]
    pub type_names: Vec<String>,
    #[serde(default)]
    pub type_suffixes: Vec<String>,
    #[serde(default)]
    pub method: Option<MethodShape>,
}

impl ErrorPredicate {
    pub fn is_empty(&self) -> bool {
        self.type_names.is_empty() && self.type_suffixes.is_empty() && self.method.is_none()
    }

    /// Whether `type_text` is error-like.
    ///
    /// `method_owners` holds the types of the current file that declare a
    /// method matching `self.method`.
    pub fn matches(&self, type_text: &str, method_owners: &HashSet<String>) -> bool {
        let normalized = normalize_type(type_text);
        if normalized.is_empty() {
            return false;
        }
        let base = base_name(normalized);

        if self.type_names.iter().any(|n| n == normalized || n == base) {
            return true;
        }
        if self
            .type_suffixes
            .iter()
            .any(|s| base.len() > s.len() && base.ends_with(s.as_str()) || base == s)
        {
            return true;
        }
        match &self.method {
            Some(shape) => {
                method_owners.contains(base) || interface_lists_method(normalized, shape)
            }
            None => false,
        }
    }
}

/// Strip pointer/reference markers and surrounding whitespace.
pub(crate) fn normalize_type(text: &str) -> &str {
    text.trim().trim_start_matches(['*', '&']).trim()
}

/// Last segment of a qualified type name, without type arguments.
fn base_name(normalized: &str) -> &str {
    let without_args = normalized
        .split(['<', '['])
        .next()
        .unwrap_or(normalized)
        .trim();
    without_args
        .rsplit(['.', ':'])
        .next()
        .unwrap_or(without_args)
}

/// `interface{ Error() string }` written inline as a result type.
fn interface_lists_method(normalized: &str, shape: &MethodShape) -> bool {
    if !normalized.starts_with("interface") {
        return false;
    }
    let compact: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();
    shape
        .result_types
        .iter()
        .any(|r| compact.contains(&format!("{}(){}", shape.name, r)))
}

/// A complete per-language descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Canonical language tag (e.g. "go").
    pub language: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// File extensions without the dot, used by the driver.
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub lexical: LexicalRules,
    #[serde(default)]
    pub imports: Vec<ImportForm>,
    pub functions: FunctionRules,
    #[serde(default)]
    pub error_predicate: ErrorPredicate,
}

impl Grammar {
    /// Check the descriptor is usable.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.language.trim().is_empty() {
            return Err(GrammarError::EmptyLanguage);
        }
        if self.functions.style == HeaderStyle::Keyword && self.functions.keywords.is_empty() {
            return Err(GrammarError::MissingFunctionKeywords(self.language.clone()));
        }
        let empty = |what| GrammarError::EmptyDelimiter {
            language: self.language.clone(),
            what,
        };
        if self.lexical.line_comments.iter().any(|m| m.is_empty()) {
            return Err(empty("line comment marker"));
        }
        if self
            .lexical
            .block_comments
            .iter()
            .any(|d| d.open.is_empty() || d.close.is_empty())
        {
            return Err(empty("block comment delimiter"));
        }
        if self
            .lexical
            .strings
            .iter()
            .any(|s| s.open.is_empty() || s.close.is_empty())
        {
            return Err(empty("string delimiter"));
        }
        if self.lexical.operators.iter().any(|o| o.is_empty()) {
            return Err(empty("operator"));
        }
        if self.imports.iter().any(|f| f.keyword.is_empty()) {
            return Err(empty("import keyword"));
        }
        Ok(())
    }

    /// Compare two words under the grammar's case rules.
    pub fn word_eq(&self, a: &str, b: &str) -> bool {
        if self.lexical.case_insensitive {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    /// Whether `word` is in `list` under the grammar's case rules.
    pub fn word_in(&self, word: &str, list: &[String]) -> bool {
        list.iter().any(|w| self.word_eq(word, w))
    }

    /// Every word the lexer should classify as a keyword.
    pub fn keyword_set(&self) -> HashSet<String> {
        let fold = |w: &String| {
            if self.lexical.case_insensitive {
                w.to_ascii_lowercase()
            } else {
                w.clone()
            }
        };
        self.lexical
            .keywords
            .iter()
            .chain(self.functions.keywords.iter())
            .chain(self.functions.type_keywords.iter())
            .chain(self.imports.iter().map(|f| &f.keyword))
            .filter(|w| w.chars().all(|c| c.is_alphanumeric() || c == '_'))
            .map(fold)
            .collect()
    }
}

/// Convert a word list into owned strings.
pub fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

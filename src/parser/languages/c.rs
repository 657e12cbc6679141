//! C grammar.

use crate::parser::grammar::{
    words, Delimiters, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, StringRule,
};

pub(crate) const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Noreturn",
];

pub(crate) const OPERATORS: &[&str] = &[
    "<<=", ">>=", "...", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=",
];

pub(crate) const MODIFIERS: &[&str] = &["static", "inline", "extern", "_Noreturn", "register"];

pub(crate) const EXCLUDED_NAMES: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "defined", "__attribute__", "__declspec",
];

pub(crate) const EXCLUDED_PREDECESSORS: &[&str] = &["return", "else", "goto", "case", "typedef", "sizeof"];

/// Lexical rules shared by C and C++.
pub(crate) fn lexical() -> LexicalRules {
    LexicalRules {
        line_comments: words(&["//"]),
        block_comments: vec![Delimiters::new("/*", "*/")],
        strings: vec![StringRule::escaped("\""), StringRule::escaped("'")],
        directive_prefix: Some('#'),
        operators: words(OPERATORS),
        keywords: words(KEYWORDS),
        ..Default::default()
    }
}

/// Build the C grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "c".to_string(),
        aliases: Vec::new(),
        extensions: words(&["c", "h"]),
        lexical: lexical(),
        imports: vec![ImportForm::new("#include", ImportShape::Include)],
        functions: FunctionRules {
            type_keywords: words(&["struct", "union", "enum"]),
            modifiers: words(MODIFIERS),
            excluded_names: words(EXCLUDED_NAMES),
            excluded_predecessors: words(EXCLUDED_PREDECESSORS),
            ..FunctionRules::type_prefixed()
        },
        error_predicate: ErrorPredicate::default(),
    }
}

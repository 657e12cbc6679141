//! Java grammar.

use crate::parser::grammar::{
    words, Delimiters, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, PathImport, StringRule, Terminator,
};

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

const OPERATORS: &[&str] = &[
    "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "<<", "...",
];

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "static", "final", "abstract", "synchronized", "native",
    "transient", "volatile", "default", "strictfp",
];

/// Build the Java grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "java".to_string(),
        aliases: Vec::new(),
        extensions: words(&["java"]),
        lexical: LexicalRules {
            line_comments: words(&["//"]),
            block_comments: vec![Delimiters::new("/*", "*/")],
            strings: vec![
                StringRule::raw("\"\"\"", "\"\"\""),
                StringRule::escaped("\""),
                StringRule::escaped("'"),
            ],
            operators: words(OPERATORS),
            identifier_chars: "$".to_string(),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![ImportForm::new(
            "import",
            ImportShape::Path(PathImport {
                separator: ".".to_string(),
                terminator: Terminator::Semicolon,
                skip_words: words(&["static"]),
                ..Default::default()
            }),
        )],
        functions: FunctionRules {
            generics: true,
            type_keywords: words(&["class", "interface", "enum"]),
            modifiers: words(MODIFIERS),
            excluded_names: words(&[
                "if", "for", "while", "switch", "catch", "synchronized", "return", "super", "this",
            ]),
            excluded_predecessors: words(&["new", "return", "throw", "else", "case"]),
            ..FunctionRules::type_prefixed()
        },
        error_predicate: ErrorPredicate {
            type_names: words(&["Throwable"]),
            type_suffixes: words(&["Exception"]),
            method: None,
        },
    }
}

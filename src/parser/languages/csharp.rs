//! C# grammar.

use crate::parser::grammar::{
    words, Delimiters, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, PathImport, StringRule, Terminator,
};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "record", "ref", "return", "sbyte", "sealed",
    "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw",
    "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "virtual",
    "void", "volatile", "while", "async", "await", "partial", "where", "var",
];

const OPERATORS: &[&str] = &[
    "=>", "??=", "??", "?.", "::", "->", "++", "--", "&&", "||", "==", "!=", "<=", ">=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<",
];

const MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "virtual", "override", "abstract",
    "sealed", "async", "extern", "unsafe", "readonly", "partial", "new", "ref", "out", "params",
    "in", "this",
];

/// Build the C# grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "csharp".to_string(),
        aliases: words(&["cs", "c#"]),
        extensions: words(&["cs"]),
        lexical: LexicalRules {
            line_comments: words(&["//"]),
            block_comments: vec![Delimiters::new("/*", "*/")],
            strings: vec![
                StringRule::raw("\"\"\"", "\"\"\""),
                StringRule::raw("$@\"", "\"").doubled(),
                StringRule::raw("@$\"", "\"").doubled(),
                StringRule::raw("@\"", "\"").doubled(),
                StringRule::escaped("$\""),
                StringRule::escaped("\""),
                StringRule::escaped("'"),
            ],
            directive_prefix: Some('#'),
            operators: words(OPERATORS),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![ImportForm::new(
            "using",
            ImportShape::Path(PathImport {
                separator: ".".to_string(),
                terminator: Terminator::Semicolon,
                skip_words: words(&["static", "global"]),
                alias_prefix: Some("=".to_string()),
                reject_next: words(&["(", "var"]),
                ..Default::default()
            }),
        )],
        functions: FunctionRules {
            generics: true,
            type_keywords: words(&["class", "struct", "interface", "record", "enum"]),
            modifiers: words(MODIFIERS),
            excluded_names: words(&[
                "if", "for", "foreach", "while", "switch", "catch", "using", "lock", "return",
                "base", "this", "typeof", "sizeof", "nameof",
            ]),
            excluded_predecessors: words(&["new", "return", "throw", "else", "case", "await"]),
            operator_keyword: Some("operator".to_string()),
            ..FunctionRules::type_prefixed()
        },
        error_predicate: ErrorPredicate {
            type_suffixes: words(&["Exception"]),
            ..Default::default()
        },
    }
}

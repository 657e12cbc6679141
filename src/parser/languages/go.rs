//! Go grammar.

use crate::parser::grammar::{
    words, Delimiters, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, MethodShape, ParamStyle, ResultStyle, StringRule,
};

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "go", "goto", "if", "interface", "map", "package", "range", "return", "select",
    "struct", "switch", "type", "var",
];

const OPERATORS: &[&str] = &[
    ":=", "...", "&&", "||", "==", "!=", "<=", ">=", "<-", "<<", ">>", "&^", "++", "--", "+=",
    "-=", "*=", "/=", "|=", "&=",
];

/// Build the Go grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "go".to_string(),
        aliases: Vec::new(),
        extensions: words(&["go"]),
        lexical: LexicalRules {
            line_comments: words(&["//"]),
            block_comments: vec![Delimiters::new("/*", "*/")],
            strings: vec![
                StringRule::escaped("\""),
                StringRule::escaped("'"),
                StringRule::raw("`", "`"),
            ],
            operators: words(OPERATORS),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![ImportForm::new(
            "import",
            ImportShape::Quoted {
                group: Some(Delimiters::new("(", ")")),
            },
        )],
        functions: FunctionRules {
            receiver: true,
            type_parameters: Some(Delimiters::new("[", "]")),
            type_keywords: words(&["type", "struct", "interface"]),
            ..FunctionRules::keyword(&["func"], ParamStyle::NameThenType, ResultStyle::Trailing)
        },
        error_predicate: ErrorPredicate {
            type_names: words(&["error"]),
            type_suffixes: Vec::new(),
            method: Some(MethodShape {
                name: "Error".to_string(),
                params: 0,
                result_types: words(&["string"]),
            }),
        },
    }
}

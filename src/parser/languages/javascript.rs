//! JavaScript grammar.

use crate::parser::grammar::{
    words, BareDefinitions, CallImport, Delimiters, ErrorPredicate, FunctionRules, Grammar,
    ImportForm, ImportShape, LexicalRules, ParamStyle, ResultStyle, StringRule,
};

const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "finally", "for", "if", "in",
    "instanceof", "let", "new", "of", "return", "static", "super", "switch", "this", "throw",
    "try", "typeof", "var", "void", "while", "with", "yield",
];

const OPERATORS: &[&str] = &[
    "===", "!==", "...", "**=", "??=", "&&=", "||=", "=>", "==", "!=", "&&", "||", "??", "?.",
    "++", "--", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "**", "<<", ">>",
];

/// Build the JavaScript grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "javascript".to_string(),
        aliases: words(&["js", "node"]),
        extensions: words(&["js", "mjs", "cjs", "jsx"]),
        lexical: LexicalRules {
            line_comments: words(&["//"]),
            block_comments: vec![Delimiters::new("/*", "*/")],
            strings: vec![
                StringRule::escaped("\""),
                StringRule::escaped("'"),
                StringRule::escaped("`"),
            ],
            regex_literals: true,
            operators: words(OPERATORS),
            identifier_chars: "$".to_string(),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![
            ImportForm::new(
                "import",
                ImportShape::From {
                    clause: "from".to_string(),
                },
            ),
            ImportForm::new(
                "require",
                ImportShape::Call(CallImport {
                    parens_optional: false,
                    literal_only: true,
                }),
            ),
        ],
        functions: FunctionRules {
            type_keywords: words(&["class"]),
            assignment_operators: words(&["=", ":"]),
            bare_definitions: BareDefinitions::TypeScope,
            excluded_names: words(&[
                "if", "for", "while", "switch", "catch", "function", "return", "super",
            ]),
            ..FunctionRules::keyword(&["function"], ParamStyle::NameOnly, ResultStyle::None)
        },
        error_predicate: ErrorPredicate::default(),
    }
}

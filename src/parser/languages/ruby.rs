//! Ruby grammar.

use crate::parser::grammar::{
    words, BlockStyle, CallImport, Delimiters, ErrorPredicate, FunctionRules, Grammar,
    ImportForm, ImportShape, LexicalRules, ParamStyle, PathImport, ResultStyle, StringRule,
    Terminator,
};

const KEYWORDS: &[&str] = &[
    "alias", "and", "begin", "break", "case", "defined?", "do", "else", "elsif", "end",
    "ensure", "false", "for", "if", "in", "next", "nil", "not", "or", "redo", "rescue", "retry",
    "return", "self", "super", "then", "true", "undef", "unless", "until", "when", "while",
    "yield", "__FILE__", "__LINE__",
];

const OPERATORS: &[&str] = &[
    "**=", "<=>", "===", "...", "||=", "&&=", "<<=", ">>=", "**", "==", "!=", ">=", "<=", "&&",
    "||", "<<", ">>", "=~", "!~", "::", "=>", "->", "+=", "-=", "*=", "/=", "..",
];

fn call_import() -> ImportShape {
    ImportShape::Call(CallImport {
        parens_optional: true,
        literal_only: true,
    })
}

fn mixin_import() -> ImportShape {
    ImportShape::Path(PathImport {
        separator: "::".to_string(),
        terminator: Terminator::LineEnd,
        list_separator: Some(",".to_string()),
        reject_next: words(&["self"]),
        ..Default::default()
    })
}

/// Build the Ruby grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "ruby".to_string(),
        aliases: words(&["rb"]),
        extensions: words(&["rb", "rake", "gemspec"]),
        lexical: LexicalRules {
            line_comments: words(&["#"]),
            block_comments: vec![Delimiters::at_line_start("=begin", "=end")],
            strings: vec![
                StringRule::escaped("\""),
                StringRule::escaped("'"),
                StringRule::escaped("`"),
            ],
            regex_literals: true,
            operators: words(OPERATORS),
            identifier_chars: "@$".to_string(),
            identifier_suffixes: "?!".to_string(),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![
            ImportForm::new("require", call_import()),
            ImportForm::new("require_relative", call_import()),
            ImportForm::new("include", mixin_import()),
            ImportForm::new("extend", mixin_import()),
            ImportForm::new("prepend", mixin_import()),
        ],
        functions: FunctionRules {
            qualifiers: words(&["."]),
            params_optional: true,
            block: BlockStyle::Indentation,
            type_keywords: words(&["class", "module"]),
            operator_names: true,
            ..FunctionRules::keyword(&["def"], ParamStyle::NameOnly, ResultStyle::None)
        },
        error_predicate: ErrorPredicate::default(),
    }
}

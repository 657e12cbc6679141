//! Bash / POSIX shell grammar.

use crate::parser::grammar::{
    words, BareDefinitions, CallImport, ErrorPredicate, FunctionRules, Grammar, ImportForm,
    ImportShape, LexicalRules, ParamStyle, ResultStyle, StringRule,
};

const KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "case", "esac", "for", "select", "while", "until", "do",
    "done", "in", "time", "local", "export", "readonly", "return",
];

const OPERATORS: &[&str] = &["&&", "||", ";;", "<<", ">>", "==", "!="];

/// Build the shell grammar.
pub fn grammar() -> Grammar {
    let source = || {
        ImportShape::Call(CallImport {
            parens_optional: true,
            literal_only: false,
        })
    };
    Grammar {
        language: "bash".to_string(),
        aliases: words(&["sh", "b", "shell"]),
        extensions: words(&["sh", "bash"]),
        lexical: LexicalRules {
            line_comments: words(&["#"]),
            line_comment_word_start: true,
            strings: vec![
                StringRule::escaped("\""),
                StringRule::raw("'", "'"),
                StringRule::escaped("`"),
            ],
            operators: words(OPERATORS),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![ImportForm::new("source", source()), ImportForm::new(".", source())],
        functions: FunctionRules {
            params_optional: true,
            bare_definitions: BareDefinitions::LineStart,
            ..FunctionRules::keyword(&["function"], ParamStyle::NameOnly, ResultStyle::None)
        },
        error_predicate: ErrorPredicate::default(),
    }
}

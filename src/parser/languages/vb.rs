//! Visual Basic .NET grammar.
//!
//! Keywords are case-insensitive; `Function`, `function` and `FUNCTION`
//! are the same word.

use crate::parser::grammar::{
    words, BlockStyle, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, ParamStyle, PathImport, ResultStyle, StringRule, Terminator,
};

const KEYWORDS: &[&str] = &[
    "AddHandler", "AndAlso", "As", "Boolean", "ByRef", "ByVal", "Call", "Case", "Catch",
    "Class", "Const", "Dim", "Do", "Each", "Else", "ElseIf", "End", "Enum", "Event", "Exit",
    "False", "Finally", "For", "Friend", "Get", "Handles", "If", "Implements", "Inherits",
    "Integer", "Interface", "Is", "Loop", "Me", "Module", "MustInherit", "MustOverride",
    "MyBase", "Namespace", "New", "Next", "Not", "Nothing", "NotInheritable", "Of", "Optional",
    "OrElse", "Overloads", "Overridable", "Overrides", "ParamArray", "Partial", "Private",
    "Property", "Protected", "Public", "RaiseEvent", "ReadOnly", "Return", "Select", "Set",
    "Shadows", "Shared", "Static", "String", "Structure", "Then", "Throw", "To", "True", "Try",
    "Using", "While", "With", "WithEvents",
];

/// Build the Visual Basic grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "vb".to_string(),
        aliases: words(&["vbnet", "visualbasic"]),
        extensions: words(&["vb"]),
        lexical: LexicalRules {
            line_comments: words(&["'", "REM"]),
            strings: vec![StringRule::raw("\"", "\"").doubled()],
            operators: words(&["<>", "<=", ">=", "&=", "+=", "-=", ":=", "<<", ">>"]),
            keywords: words(KEYWORDS),
            case_insensitive: true,
            directive_prefix: Some('#'),
            ..Default::default()
        },
        imports: vec![ImportForm::new(
            "Imports",
            ImportShape::Path(PathImport {
                separator: ".".to_string(),
                terminator: Terminator::LineEnd,
                list_separator: Some(",".to_string()),
                alias_prefix: Some("=".to_string()),
                ..Default::default()
            }),
        )],
        functions: FunctionRules {
            params_optional: true,
            type_keyword: Some("As".to_string()),
            block: BlockStyle::Indentation,
            type_keywords: words(&["Class", "Module", "Structure", "Interface"]),
            modifiers: words(&["ByVal", "ByRef", "Optional", "ParamArray"]),
            excluded_predecessors: words(&["End", "Exit"]),
            ..FunctionRules::keyword(&["Function", "Sub"], ParamStyle::NameAsType, ResultStyle::AsClause)
        },
        error_predicate: ErrorPredicate {
            type_suffixes: words(&["Exception"]),
            ..Default::default()
        },
    }
}

//! C++ grammar, layered on the C rules.

use crate::parser::grammar::{
    words, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape, StringRule,
};
use crate::parser::languages::c;

const EXTRA_KEYWORDS: &[&str] = &[
    "bool", "catch", "class", "constexpr", "decltype", "delete", "explicit", "friend",
    "mutable", "namespace", "new", "noexcept", "nullptr", "operator", "override", "private",
    "protected", "public", "template", "this", "throw", "try", "typename", "using", "virtual",
];

/// Build the C++ grammar.
pub fn grammar() -> Grammar {
    let mut lexical = c::lexical();
    lexical.keywords.extend(words(EXTRA_KEYWORDS));
    lexical.operators.push("::".to_string());
    lexical.strings.insert(0, StringRule::raw("R\"(", ")\""));

    let mut modifiers = words(c::MODIFIERS);
    modifiers.extend(words(&["virtual", "explicit", "constexpr", "friend", "mutable"]));
    let mut excluded_predecessors = words(c::EXCLUDED_PREDECESSORS);
    excluded_predecessors.extend(words(&["new", "delete", "throw"]));
    let mut excluded_names = words(c::EXCLUDED_NAMES);
    excluded_names.extend(words(&["catch", "decltype", "alignof", "static_assert"]));

    Grammar {
        language: "cpp".to_string(),
        aliases: words(&["c++", "cxx"]),
        extensions: words(&["cpp", "cc", "cxx", "hpp", "hh", "hxx", "h"]),
        lexical,
        imports: vec![ImportForm::new("#include", ImportShape::Include)],
        functions: FunctionRules {
            qualifiers: words(&["::"]),
            generics: true,
            type_keywords: words(&["class", "struct", "union"]),
            modifiers,
            excluded_names,
            excluded_predecessors,
            operator_keyword: Some("operator".to_string()),
            trailing_result: Some("->".to_string()),
            ..FunctionRules::type_prefixed()
        },
        error_predicate: ErrorPredicate {
            type_names: words(&["exception", "error_code"]),
            ..Default::default()
        },
    }
}

//! Python grammar.

use crate::parser::grammar::{
    words, BlockStyle, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, ParamStyle, PathImport, ResultStyle, StringRule, Terminator,
};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "continue",
    "del", "elif", "else", "except", "finally", "for", "global", "if", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

const OPERATORS: &[&str] = &[
    "...", "**=", "//=", "->", "**", "//", "==", "!=", "<=", ">=", ":=", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "<<", ">>", "@=",
];

/// String prefixes, lower case; every case variant is accepted.
const STRING_PREFIXES: &[&str] = &["", "r", "u", "b", "f", "br", "rb", "fr", "rf"];

/// Every upper/lower case spelling of `prefix`.
fn case_variants(prefix: &str) -> Vec<String> {
    prefix.chars().fold(vec![String::new()], |acc, ch| {
        acc.into_iter()
            .flat_map(|s| {
                let lower = format!("{}{}", s, ch.to_ascii_lowercase());
                let upper = format!("{}{}", s, ch.to_ascii_uppercase());
                [lower, upper]
            })
            .collect()
    })
}

/// Single and triple quoted literals for every prefix.
fn string_rules() -> Vec<StringRule> {
    let mut rules = Vec::new();
    for prefix in STRING_PREFIXES.iter().flat_map(|p| case_variants(p)) {
        for quote in ["\"", "'"] {
            let triple = quote.repeat(3);
            rules.push(StringRule {
                open: format!("{}{}", prefix, triple),
                ..StringRule::escaped(&triple)
            });
            rules.push(StringRule {
                open: format!("{}{}", prefix, quote),
                ..StringRule::escaped(quote)
            });
        }
    }
    rules.dedup();
    rules
}

/// Build the Python grammar.
pub fn grammar() -> Grammar {
    Grammar {
        language: "python".to_string(),
        aliases: words(&["py", "python3"]),
        extensions: words(&["py", "pyw", "pyi"]),
        lexical: LexicalRules {
            line_comments: words(&["#"]),
            strings: string_rules(),
            operators: words(OPERATORS),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: vec![
            ImportForm::new(
                "import",
                ImportShape::Path(PathImport {
                    separator: ".".to_string(),
                    terminator: Terminator::LineEnd,
                    list_separator: Some(",".to_string()),
                    alias_suffix: Some("as".to_string()),
                    ..Default::default()
                }),
            ),
            ImportForm::new(
                "from",
                ImportShape::Path(PathImport {
                    separator: ".".to_string(),
                    terminator: Terminator::Keyword("import".to_string()),
                    relative: true,
                    ..Default::default()
                }),
            ),
        ],
        functions: FunctionRules {
            block: BlockStyle::Indentation,
            type_keywords: words(&["class"]),
            ..FunctionRules::keyword(
                &["def"],
                ParamStyle::NameColonType,
                ResultStyle::Arrow {
                    token: "->".to_string(),
                },
            )
        },
        error_predicate: ErrorPredicate {
            type_suffixes: words(&["Error", "Exception"]),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, FileReport, SourceFile};

    fn report(source: &[u8]) -> FileReport {
        analyze(&SourceFile::new("sim.py", "py", source)).unwrap()
    }

    #[test]
    fn test_case_variants() {
        assert_eq!(case_variants(""), vec![""]);
        assert_eq!(case_variants("rb"), vec!["rb", "rB", "Rb", "RB"]);
    }

    #[test]
    fn test_python_imports() {
        let source = br#"
import pandas
import numpy as np
from bokeh.io import show
from bokeh.plotting import figure
from collections import Counter,defaultdict
from multiprocessing import (
    Process,
    Pipe,
)
from math import *
from . import siblings
from ..pkg.mod import thing
import os.path, sys as system
"#;
        let report = report(source);
        assert_eq!(
            report.modules().collect::<Vec<_>>(),
            vec![
                "pandas",
                "numpy",
                "bokeh.io",
                "bokeh.plotting",
                "collections",
                "multiprocessing",
                "math",
                ".siblings",
                "..pkg.mod",
                "os.path",
                "sys",
            ]
        );
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_python_functions() {
        let source = br#"
QUIT = "QUIT"

class sim_helper(object):

    def __init__(self,L,fN,u):
        self.L = L
        self.u = u

    def sweep(self) -> None:
        pass

    @staticmethod
    def parse(raw: str, strict: bool = False) -> ValueError:
        """def not_a_function():"""
        return None


async def fetch(url: str) -> Dict[str, int]:
    pass
"#;
        let report = report(source);
        let names: Vec<_> = report.functions.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(
            names,
            vec!["sim_helper.__init__", "sim_helper.sweep", "sim_helper.parse", "fetch"]
        );

        let parse = report.find_function("parse").expect("Expected parse");
        let params: Vec<_> = parse.params.iter().map(|p| (p.name.as_str(), p.type_name.as_str())).collect();
        assert_eq!(params, vec![("raw", "str"), ("strict", "bool")]);
        assert!(parse.returns_error_like);

        let fetch = report.find_function("fetch").expect("Expected fetch");
        assert_eq!(fetch.owner, None);
        assert_eq!(fetch.results, vec!["Dict[str, int]"]);
    }

    #[test]
    fn test_python_prefixed_strings() {
        let source = b"doc = rb'import hidden'\nmsg = F\"\"\"\nimport also_hidden\n\"\"\"\nimport shown\n";
        let report = report(source);
        assert_eq!(report.modules().collect::<Vec<_>>(), vec!["shown"]);
    }
}

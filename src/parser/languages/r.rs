//! R grammar.

use crate::parser::grammar::{
    words, CallImport, ErrorPredicate, FunctionRules, Grammar, ImportForm, ImportShape,
    LexicalRules, ParamStyle, ResultStyle, StringRule,
};

const KEYWORDS: &[&str] = &[
    "if", "else", "repeat", "while", "for", "in", "next", "break", "TRUE", "FALSE", "NULL",
    "Inf", "NaN", "NA",
];

const OPERATORS: &[&str] = &[
    "%in%", "%>%", "%%", "<<-", "->>", ":::", "<-", "->", "::", "==", "!=", "<=", ">=", "&&",
    "||", "|>",
];

/// Build the R grammar.
pub fn grammar() -> Grammar {
    let call = || {
        ImportShape::Call(CallImport {
            parens_optional: false,
            literal_only: false,
        })
    };
    Grammar {
        language: "r".to_string(),
        aliases: Vec::new(),
        extensions: words(&["r", "R"]),
        lexical: LexicalRules {
            line_comments: words(&["#"]),
            strings: vec![
                StringRule::escaped("\""),
                StringRule::escaped("'"),
                StringRule::escaped("`"),
            ],
            operators: words(OPERATORS),
            identifier_chars: ".".to_string(),
            keywords: words(KEYWORDS),
            ..Default::default()
        },
        imports: ["library", "require", "requireNamespace", "loadNamespace", "source"]
            .iter()
            .map(|keyword| ImportForm::new(keyword, call()))
            .collect(),
        functions: FunctionRules {
            assignment_operators: words(&["<-", "<<-", "="]),
            ..FunctionRules::keyword(&["function"], ParamStyle::NameOnly, ResultStyle::None)
        },
        error_predicate: ErrorPredicate::default(),
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze, FileReport, SourceFile};

    fn report(source: &[u8]) -> FileReport {
        analyze(&SourceFile::new("analysis.R", "r", source)).unwrap()
    }

    #[test]
    fn test_r_imports() {
        let source = br#"
library(ggplot2)
library("dplyr")
suppressMessages(require(data.table))
source("helpers.R")
# library(hidden)
requireNamespace("jsonlite", quietly = TRUE)
"#;
        let report = report(source);
        assert_eq!(
            report.modules().collect::<Vec<_>>(),
            vec!["ggplot2", "dplyr", "data.table", "helpers.R", "jsonlite"]
        );
    }

    #[test]
    fn test_r_functions() {
        let source = br#"
normalize <- function(x, na.rm = TRUE) {
  (x - mean(x, na.rm = na.rm)) / sd(x)
}

scale.default = function(v) v * 2

sapply(1:10, function(i) i + 1)
"#;
        let report = report(source);
        let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["normalize", "scale.default"]);
        let params: Vec<_> = report.functions[0].params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["x", "na.rm"]);
    }
}

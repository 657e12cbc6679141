//! Import extraction.
//!
//! Scans the comment-free token view for the import forms listed in a
//! grammar and merges every statement or block into one ordered,
//! deduplicated list of module identifiers.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::facts::{Diagnostic, Extraction, ImportRecord, Span};
use crate::analysis::tokens::{
    adjacent, follows_member_access, is_line_first, join, matching_close, split_top_level, starts_statement,
    unquote,
};
use crate::parser::grammar::{CallImport, Delimiters, Grammar, ImportForm, ImportShape, PathImport, Terminator};
use crate::parser::{Token, TokenKind, TokenStream};

lazy_static! {
    static ref INCLUDE_RE: Regex = Regex::new(r#"^#\s*include\s*[<"]([^>"]+)[>"]"#).unwrap();
}

/// Extract the imports of one file.
pub fn extract_imports(stream: &TokenStream, grammar: &Grammar) -> Extraction<ImportRecord> {
    let tokens = stream.code_tokens();
    let mut scan = ImportScan {
        grammar,
        tokens: &tokens,
        seen: HashSet::new(),
        out: Extraction::default(),
    };
    scan.run();
    scan.out
}

struct ImportScan<'s, 'a> {
    grammar: &'s Grammar,
    tokens: &'s [Token<'a>],
    seen: HashSet<String>,
    out: Extraction<ImportRecord>,
}

impl<'s, 'a> ImportScan<'s, 'a> {
    fn run(&mut self) {
        let has_include = self
            .grammar
            .imports
            .iter()
            .any(|f| f.shape == ImportShape::Include);

        let mut i = 0;
        while i < self.tokens.len() {
            let token = self.tokens[i];
            if token.kind == TokenKind::Directive {
                if has_include {
                    self.include(&token);
                }
                i += 1;
                continue;
            }
            let Some(form) = self.form_for(i) else {
                i += 1;
                continue;
            };
            let next = match &form.shape {
                ImportShape::Quoted { group } => self.quoted(i, group.as_ref()),
                ImportShape::Path(path) => self.path(i, path),
                ImportShape::From { clause } => self.from(i, clause),
                ImportShape::Call(call) => self.call(i, call),
                ImportShape::Include => i + 1,
            };
            i = next.max(i + 1);
        }
    }

    /// The import form introduced by token `i`, if it is in import position.
    fn form_for(&self, i: usize) -> Option<&'s ImportForm> {
        let token = &self.tokens[i];
        if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword | TokenKind::Punctuation) {
            return None;
        }
        let grammar = self.grammar;
        let form = grammar
            .imports
            .iter()
            .find(|f| f.shape != ImportShape::Include && grammar.word_eq(token.text, &f.keyword))?;
        if token.kind == TokenKind::Punctuation {
            return starts_statement(self.tokens, i).then_some(form);
        }
        if follows_member_access(self.tokens, i) {
            return None;
        }
        let opens_call = self.get(i + 1).map(|t| t.is_punct("(")).unwrap_or(false);
        match form.shape {
            ImportShape::Call(_) => Some(form),
            ImportShape::From { .. } if opens_call => Some(form),
            _ => starts_statement(self.tokens, i).then_some(form),
        }
    }

    fn push(&mut self, module: &str, span: Span) {
        let module = module.trim();
        if module.is_empty() {
            self.out
                .diagnostics
                .push(Diagnostic::malformed_import(span, "empty module path"));
            return;
        }
        if self.seen.insert(module.to_string()) {
            self.out.items.push(ImportRecord {
                module: module.to_string(),
                span,
            });
        }
    }

    fn malformed(&mut self, span: Span, message: String) {
        self.out.diagnostics.push(Diagnostic::malformed_import(span, message));
    }

    fn get(&self, i: usize) -> Option<&Token<'a>> {
        self.tokens.get(i)
    }

    fn include(&mut self, directive: &Token) {
        let Some(caps) = INCLUDE_RE.captures(directive.text) else {
            return;
        };
        let module = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        self.push(module, directive.span);
    }

    /// `import "m"`, `import alias "m"` or `import ( ... )`.
    fn quoted(&mut self, i: usize, group: Option<&Delimiters>) -> usize {
        let keyword = self.tokens[i];
        let mut j = i + 1;

        if let Some(group) = group {
            if self.get(j).map(|t| t.is_punct(&group.open)).unwrap_or(false) {
                let Some(close) = matching_close(self.tokens, j, &group.open, &group.close) else {
                    self.malformed(keyword.span, format!("unterminated '{}' group", keyword.text));
                    return self.tokens.len();
                };
                j += 1;
                while j < close {
                    let entry = self.tokens[j];
                    if entry.is_string() {
                        let prev = self.tokens[j - 1];
                        let aliased = j - 1 > i + 1
                            && (prev.is_word() || prev.is_punct("."))
                            && prev.span.line == entry.span.line;
                        let start = if aliased { prev.span } else { entry.span };
                        self.push(unquote(entry.text), start.to(&entry.span));
                    } else if !(entry.is_word() || entry.is_punct(".") || entry.is_punct(";") || entry.is_punct(",")) {
                        self.malformed(entry.span, format!("unexpected '{}' in import group", entry.text));
                    }
                    j += 1;
                }
                return close + 1;
            }
        }

        // Optional alias: a name, `.` or `_` on the same line as the path.
        if let (Some(alias), Some(path)) = (self.get(j), self.get(j + 1)) {
            if (alias.is_word() || alias.is_punct(".")) && path.is_string() && path.span.line == keyword.span.line {
                j += 1;
            }
        }
        match self.get(j).copied() {
            Some(path) if path.is_string() => {
                self.push(unquote(path.text), keyword.span.to(&path.span));
                j + 1
            }
            _ => {
                self.malformed(keyword.span, format!("missing module path after '{}'", keyword.text));
                i + 1
            }
        }
    }

    /// Dotted-path imports.
    fn path(&mut self, i: usize, rules: &PathImport) -> usize {
        let keyword = self.tokens[i];
        let mut j = i + 1;

        if let Some(next) = self.get(j) {
            if rules.reject_next.iter().any(|w| self.grammar.word_eq(next.text, w)) {
                return i + 1;
            }
        }
        while let Some(next) = self.get(j) {
            if next.is_word() && self.grammar.word_in(next.text, &rules.skip_words) {
                j += 1;
            } else {
                break;
            }
        }

        let mut found_any = false;
        loop {
            if let (Some(alias), Some(op), Some(_)) = (self.get(j), self.get(j + 1), self.get(j + 2)) {
                if alias.is_word() && rules.alias_prefix.as_deref() == Some(op.text) {
                    j += 2;
                }
            }

            let (end, module) = self.dotted_path(j, keyword.span.line, rules);
            if end == j {
                if !found_any {
                    let at = self.get(j).map(|t| t.span).unwrap_or(keyword.span);
                    self.malformed(at, format!("missing module path after '{}'", keyword.text));
                }
                return self.finish_statement(j, keyword.span.line);
            }
            let last = self.tokens[end - 1];
            j = end;

            if let (Some(word), Some(alias)) = (self.get(j), rules.alias_suffix.as_deref()) {
                if word.is_word() && self.grammar.word_eq(word.text, alias) {
                    j += 1;
                    if self.get(j).map(|t| t.is_word()).unwrap_or(false) {
                        j += 1;
                    }
                }
            }

            // A path not followed by its terminator is some other statement.
            if rules.terminator == Terminator::Semicolon {
                let ok = match self.get(j) {
                    Some(t) => t.is_punct(";") || rules.list_separator.as_deref() == Some(t.text),
                    None => false,
                };
                if !ok {
                    return i + 1;
                }
            }

            if let Terminator::Keyword(word) = &rules.terminator {
                let bare_relative = rules.relative && module.chars().all(|c| rules.separator.contains(c));
                let at_keyword = self
                    .get(j)
                    .map(|t| t.is_word() && self.grammar.word_eq(t.text, word))
                    .unwrap_or(false);
                if bare_relative && at_keyword {
                    return self.relative_names(j + 1, &module, keyword.span);
                }
            }

            self.push(&module, keyword.span.to(&last.span));
            found_any = true;

            match (self.get(j), rules.list_separator.as_deref()) {
                (Some(sep), Some(list)) if sep.text == list && sep.kind == TokenKind::Punctuation => j += 1,
                _ => break,
            }
        }

        match &rules.terminator {
            Terminator::Semicolon => j + 1,
            Terminator::LineEnd => j,
            Terminator::Keyword(word) => match self.get(j) {
                Some(t) if t.is_word() && self.grammar.word_eq(t.text, word) => self.finish_statement(j + 1, t.span.line),
                _ => {
                    self.malformed(keyword.span, format!("expected '{}' after '{}' path", word, keyword.text));
                    self.finish_statement(j, keyword.span.line)
                }
            },
        }
    }

    /// Names after `from . import`, each recorded under the leading dots.
    /// A wildcard or empty list records the dots alone.
    fn relative_names(&mut self, j: usize, dots: &str, start: Span) -> usize {
        let tokens = self.tokens;
        let line = tokens[j - 1].span.line;
        let (list, end) = match tokens.get(j) {
            Some(t) if t.is_punct("(") => match matching_close(tokens, j, "(", ")") {
                Some(close) => (&tokens[j + 1..close], close + 1),
                None => {
                    self.malformed(start, "unterminated import list".to_string());
                    return tokens.len();
                }
            },
            _ => {
                let end = self.finish_statement(j, line);
                (&tokens[j..end], end)
            }
        };

        let mut found_any = false;
        for segment in split_top_level(list, false) {
            if let Some(name) = segment.first().filter(|t| t.is_word()) {
                self.push(&format!("{}{}", dots, name.text), start.to(&name.span));
                found_any = true;
            }
        }
        if !found_any {
            let last = tokens[end.saturating_sub(1).max(j - 1)];
            self.push(dots, start.to(&last.span));
        }
        end
    }

    /// Read `a.b.c` starting at `j`; returns the end index and the path text.
    fn dotted_path(&self, mut j: usize, line: usize, rules: &PathImport) -> (usize, String) {
        let start = j;
        let sep = rules.separator.as_str();
        let on_line = |t: &Token| rules.terminator != Terminator::LineEnd || t.span.line == line;

        if rules.relative {
            while let Some(t) = self.get(j) {
                if t.kind == TokenKind::Punctuation && !t.text.is_empty() && t.text.chars().all(|c| sep.contains(c)) && on_line(t) {
                    j += 1;
                } else {
                    break;
                }
            }
        }
        let mut expect_segment = true;
        while let Some(t) = self.get(j) {
            if !on_line(t) {
                break;
            }
            if expect_segment && (t.is_word() || t.is_punct("*")) {
                if t.is_word() && rules.alias_suffix.as_deref().map(|a| self.grammar.word_eq(t.text, a)).unwrap_or(false) && j > start {
                    break;
                }
                if let Terminator::Keyword(word) = &rules.terminator {
                    if self.grammar.word_eq(t.text, word) {
                        break;
                    }
                }
                expect_segment = false;
                j += 1;
            } else if !expect_segment && t.kind == TokenKind::Punctuation && t.text == sep {
                expect_segment = true;
                j += 1;
            } else {
                break;
            }
        }
        // A dangling separator is not part of the path.
        if expect_segment && j > start && self.tokens[j - 1].text == sep && j - 1 > start {
            j -= 1;
        }
        let text: String = self.tokens[start..j].iter().map(|t| t.text).collect();
        (j, text)
    }

    /// Skip the rest of a statement: a parenthesised list or the rest of the line.
    fn finish_statement(&self, mut j: usize, line: usize) -> usize {
        if let Some(t) = self.get(j) {
            if t.is_punct("(") {
                return matching_close(self.tokens, j, "(", ")").map(|c| c + 1).unwrap_or(self.tokens.len());
            }
        }
        while let Some(t) = self.get(j) {
            if t.span.line != line || t.is_punct(";") {
                break;
            }
            j += 1;
        }
        j
    }

    /// `import x from "m"`, `import "m"`, `import("m")`.
    fn from(&mut self, i: usize, clause: &str) -> usize {
        let keyword = self.tokens[i];
        let Some(next) = self.get(i + 1).copied() else {
            self.malformed(keyword.span, format!("missing module after '{}'", keyword.text));
            return i + 1;
        };
        if next.is_punct(".") {
            return i + 1;
        }
        if next.is_string() {
            self.push(unquote(next.text), keyword.span.to(&next.span));
            return i + 2;
        }
        if next.is_punct("(") {
            return match self.get(i + 2).copied() {
                Some(arg) if arg.is_string() => {
                    self.push(unquote(arg.text), keyword.span.to(&arg.span));
                    i + 3
                }
                _ => {
                    self.malformed(keyword.span, "dynamic import with a non-literal argument".to_string());
                    i + 2
                }
            };
        }

        let mut depth = 0i32;
        let mut j = i + 1;
        while let Some(t) = self.get(j).copied() {
            match t.text {
                "{" | "(" | "[" if t.kind == TokenKind::Punctuation => depth += 1,
                "}" | ")" | "]" if t.kind == TokenKind::Punctuation => depth -= 1,
                ";" if t.kind == TokenKind::Punctuation => break,
                _ => {}
            }
            if depth <= 0 && t.is_word() && self.grammar.word_eq(t.text, clause) {
                return match self.get(j + 1).copied() {
                    Some(module) if module.is_string() => {
                        self.push(unquote(module.text), keyword.span.to(&module.span));
                        j + 2
                    }
                    _ => {
                        self.malformed(t.span, format!("missing module literal after '{}'", clause));
                        j + 1
                    }
                };
            }
            // Another statement started without finding the clause.
            if depth <= 0 && j > i + 1 && is_line_first(self.tokens, j) && self.form_for(j).is_some() {
                break;
            }
            j += 1;
        }
        self.malformed(keyword.span, format!("missing '{}' clause", clause));
        j
    }

    /// `require("m")`, `library(m)`, `source ./lib.sh`.
    fn call(&mut self, i: usize, rules: &CallImport) -> usize {
        let keyword = self.tokens[i];
        let Some(next) = self.get(i + 1).copied() else {
            return i + 1;
        };

        if next.is_punct("(") {
            let Some(arg) = self.get(i + 2).copied() else {
                self.malformed(keyword.span, format!("unterminated call to '{}'", keyword.text));
                return i + 2;
            };
            if arg.is_string() {
                self.push(unquote(arg.text), keyword.span.to(&arg.span));
                return i + 3;
            }
            let closes = self
                .get(i + 3)
                .map(|t| t.is_punct(")") || t.is_punct(","))
                .unwrap_or(false);
            if !rules.literal_only && arg.is_word() && closes {
                self.push(arg.text, keyword.span.to(&arg.span));
                return i + 3;
            }
            self.malformed(arg.span, format!("non-literal argument to '{}'", keyword.text));
            return i + 2;
        }

        if !rules.parens_optional || adjacent(&keyword, &next) || next.span.line != keyword.span.line {
            return i + 1;
        }
        if next.is_string() {
            self.push(unquote(next.text), keyword.span.to(&next.span));
            return i + 2;
        }
        if rules.literal_only {
            if next.is_word() {
                self.malformed(next.span, format!("non-literal argument to '{}'", keyword.text));
            }
            return i + 1;
        }
        if matches!(next.text, ";" | "|" | "&") {
            self.malformed(keyword.span, format!("missing argument to '{}'", keyword.text));
            return i + 1;
        }

        let mut j = i + 1;
        while let Some(t) = self.get(j + 1) {
            if adjacent(&self.tokens[j], t) && !matches!(t.text, ";" | "|" | "&" | "&&" | "||" | ")") {
                j += 1;
            } else {
                break;
            }
        }
        let run = &self.tokens[i + 1..=j];
        let last = self.tokens[j];
        self.push(&join(run), keyword.span.to(&last.span));
        j + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{languages, tokenize};

    fn modules(src: &str, grammar: &Grammar) -> Vec<String> {
        let stream = tokenize(src.as_bytes(), grammar).unwrap();
        extract_imports(&stream, grammar)
            .items
            .into_iter()
            .map(|r| r.module)
            .collect()
    }

    #[test]
    fn test_go_single_and_grouped() {
        let src = "package main\n\nimport \"math\"\nimport (\n\t\"container/list\"\n\tf \"fmt\"\n)\nimport _ \"embed\"\n";
        assert_eq!(
            modules(src, &languages::go::grammar()),
            vec!["math", "container/list", "fmt", "embed"]
        );
    }

    #[test]
    fn test_go_group_with_commas() {
        let grammar = languages::go::grammar();
        let stream = tokenize(b"import (\"a\", \"b\")\n", &grammar).unwrap();
        let result = extract_imports(&stream, &grammar);
        let names: Vec<_> = result.items.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_python_relative_names() {
        let grammar = languages::python::grammar();
        let src = "from . import siblings, cousins as c\nfrom .. import (\n    up,\n)\nfrom . import *\nfrom .pkg import x\n";
        let stream = tokenize(src.as_bytes(), &grammar).unwrap();
        let result = extract_imports(&stream, &grammar);
        let names: Vec<_> = result.items.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(names, vec![".siblings", ".cousins", "..up", ".", ".pkg"]);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.items[2].span.line, 2);
    }

    #[test]
    fn test_dedup_first_wins() {
        let grammar = languages::go::grammar();
        let src = "import \"fmt\"\nimport (\n\"os\"\n\"fmt\"\n)\n";
        let stream = tokenize(src.as_bytes(), &grammar).unwrap();
        let result = extract_imports(&stream, &grammar);
        let names: Vec<_> = result.items.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(names, vec!["fmt", "os"]);
        assert_eq!(result.items[0].span.line, 1);
    }

    #[test]
    fn test_unterminated_group_is_diagnosed() {
        let grammar = languages::go::grammar();
        let stream = tokenize(b"import (\n\"fmt\"\n", &grammar).unwrap();
        let result = extract_imports(&stream, &grammar);
        assert!(result.items.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_member_access_is_not_import() {
        let grammar = languages::javascript::grammar();
        let src = "const x = loader.require('hidden');\nconst y = require('shown');\n";
        assert_eq!(modules(src, &grammar), vec!["shown"]);
    }

    #[test]
    fn test_include_directive() {
        let grammar = languages::c::grammar();
        let src = "#include <stdio.h>\n#  include \"local.h\"\n#define X 1\n";
        assert_eq!(modules(src, &grammar), vec!["stdio.h", "local.h"]);
    }

    #[test]
    fn test_call_literal_only() {
        let grammar = languages::ruby::grammar();
        let stream = tokenize(b"require 'json'\nrequire some_path\n", &grammar).unwrap();
        let result = extract_imports(&stream, &grammar);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].module, "json");
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_shell_source_run() {
        let grammar = languages::bash::grammar();
        let src = "source ./lib/util.sh\n. \"$HOME/.profile\"\n";
        assert_eq!(modules(src, &grammar), vec!["./lib/util.sh", "$HOME/.profile"]);
    }
}

//! Function signature extraction.
//!
//! Header-only: names, owners, parameter lists and declared result types are
//! read from declaration headers; bodies are never interpreted.

use std::collections::HashSet;

use crate::analysis::facts::{Diagnostic, Extraction, FunctionSignature, Span};
use crate::analysis::params::{annotated_result, parse_params, trailing_results};
use crate::analysis::scope::ScopeMap;
use crate::analysis::tokens::{adjacent, follows_member_access, is_line_first, join, matching_close, unquote};
use crate::parser::grammar::{BareDefinitions, ErrorPredicate, Grammar, HeaderStyle, ParamStyle, ResultStyle};
use crate::parser::{Token, TokenKind, TokenStream};

/// Qualifiers that mean "the enclosing type" (`def self.name`).
const SELF_QUALIFIERS: &[&str] = &["self", "this"];

/// Punctuation allowed inside a C-family declaration prefix.
const PREFIX_PUNCTUATION: &[&str] = &["*", "&", "&&", "::", ".", "@", "?", "[", "]", "...", "^"];

/// Tokens after a parameter list that may precede a body or `;`.
const QUALIFIER_PUNCTUATION: &[&str] = &[",", ".", "::", "<", ">", ">>", "&", "&&", "*", "->", "[", "]", "?", "@"];

/// Longest declaration prefix considered, in tokens.
const MAX_PREFIX: usize = 48;

/// Extract function and method signatures from one file.
pub fn extract_functions(stream: &TokenStream, grammar: &Grammar) -> Extraction<FunctionSignature> {
    let tokens = stream.code_tokens();
    let scopes = ScopeMap::build(&tokens, grammar);
    let mut scan = FunctionScan {
        grammar,
        tokens: &tokens,
        scopes: &scopes,
        out: Extraction::default(),
    };
    match grammar.functions.style {
        HeaderStyle::Keyword => scan.keyword_headers(),
        HeaderStyle::TypePrefixed => scan.type_prefixed_headers(),
    }
    let mut out = scan.out;
    mark_error_like(&mut out.items, &grammar.error_predicate);
    out
}

/// Set `returns_error_like` from the last declared result of each signature.
fn mark_error_like(functions: &mut [FunctionSignature], predicate: &ErrorPredicate) {
    if predicate.is_empty() {
        return;
    }
    let method_owners: HashSet<String> = match &predicate.method {
        Some(shape) => functions
            .iter()
            .filter(|f| shape.matches(f))
            .filter_map(|f| f.owner.clone())
            .collect(),
        None => HashSet::new(),
    };
    for function in functions.iter_mut() {
        function.returns_error_like = function
            .results
            .last()
            .map(|r| predicate.matches(r, &method_owners))
            .unwrap_or(false);
    }
}

/// How a C-family header ends.
enum HeaderEnd {
    Body(usize),
    Expression(usize),
    Prototype(usize),
}

struct FunctionScan<'s, 'a> {
    grammar: &'s Grammar,
    tokens: &'s [Token<'a>],
    scopes: &'s ScopeMap,
    out: Extraction<FunctionSignature>,
}

impl<'s, 'a> FunctionScan<'s, 'a> {
    fn get(&self, i: usize) -> Option<&Token<'a>> {
        self.tokens.get(i)
    }

    fn is_punct_at(&self, i: usize, text: &str) -> bool {
        self.get(i).map(|t| t.is_punct(text)).unwrap_or(false)
    }

    fn malformed(&mut self, span: Span, message: impl Into<String>) {
        self.out
            .diagnostics
            .push(Diagnostic::malformed_function_header(span, message));
    }

    fn push(&mut self, signature: FunctionSignature) {
        if !signature.name.is_empty() {
            self.out.items.push(signature);
        }
    }

    fn preceded_by_excluded(&self, i: usize) -> bool {
        i > 0
            && self.tokens[i - 1].is_word()
            && self
                .grammar
                .word_in(self.tokens[i - 1].text, &self.grammar.functions.excluded_predecessors)
    }

    // ----- keyword-led headers -------------------------------------------

    fn keyword_headers(&mut self) {
        let grammar = self.grammar;
        let rules = &grammar.functions;
        for i in 0..self.tokens.len() {
            let token = self.tokens[i];
            if token.is_word()
                && self.grammar.word_in(token.text, &rules.keywords)
                && !follows_member_access(self.tokens, i)
                && !self.preceded_by_excluded(i)
            {
                self.keyword_header(i);
                continue;
            }
            match rules.bare_definitions {
                BareDefinitions::Never => {}
                BareDefinitions::LineStart => self.line_start_definition(i),
                BareDefinitions::TypeScope => self.type_scope_definition(i),
            }
        }
    }

    fn keyword_header(&mut self, i: usize) {
        let grammar = self.grammar;
        let rules = &grammar.functions;
        let keyword = self.tokens[i];
        let mut j = i + 1;
        if self.is_punct_at(j, "*") {
            j += 1;
        }

        let mut receiver_owner = None;
        if rules.receiver && self.is_punct_at(j, "(") {
            if let Some(close) = matching_close(self.tokens, j, "(", ")") {
                let named_after = self
                    .get(close + 1)
                    .map(|t| t.kind == TokenKind::Identifier)
                    .unwrap_or(false);
                if named_after && (self.is_punct_at(close + 2, "(") || self.is_punct_at(close + 2, "[")) {
                    receiver_owner = receiver_type(&self.tokens[j + 1..close]);
                    j = close + 1;
                }
            }
        }

        let (name, qualifier, mut next) = match self.header_name(j) {
            Some(found) => found,
            None if self.is_punct_at(j, "(") => {
                if matching_close(self.tokens, j, "(", ")").is_none() {
                    self.malformed(keyword.span, format!("unterminated parameter list after '{}'", keyword.text));
                    return;
                }
                match self.bound_name(i) {
                    Some(bound) => (bound, None, j),
                    // Anonymous function expression.
                    None => return,
                }
            }
            None => {
                self.malformed(keyword.span, format!("missing name after '{}'", keyword.text));
                return;
            }
        };

        if let Some(tp) = &rules.type_parameters {
            if self.is_punct_at(next, &tp.open) {
                match matching_close(self.tokens, next, &tp.open, &tp.close) {
                    Some(close) => next = close + 1,
                    None => {
                        self.malformed(keyword.span, format!("unterminated type parameters of '{}'", name));
                        return;
                    }
                }
            }
        }

        let (params, close) = if self.is_punct_at(next, "(") {
            match matching_close(self.tokens, next, "(", ")") {
                Some(close) => (parse_params(&self.tokens[next + 1..close], self.grammar), close),
                None => {
                    self.malformed(keyword.span, format!("unterminated parameter list of '{}'", name));
                    return;
                }
            }
        } else if rules.params_optional {
            let line = self.tokens[next - 1].span.end_line;
            let mut end = next;
            while let Some(t) = self.get(end) {
                if t.span.line != line || t.is_punct(";") || t.is_punct("{") || t.is_punct("=") {
                    break;
                }
                end += 1;
            }
            let params = if rules.params == ParamStyle::NameOnly {
                parse_params(&self.tokens[next..end], self.grammar)
            } else {
                Vec::new()
            };
            (params, end - 1)
        } else {
            self.malformed(keyword.span, format!("missing parameter list of '{}'", name));
            return;
        };

        let (results, last) = self.keyword_results(close);
        let owner = receiver_owner.or_else(|| match qualifier {
            Some(q) if SELF_QUALIFIERS.iter().any(|s| self.grammar.word_eq(&q, s)) => {
                self.scopes.owner_at(i).map(str::to_string)
            }
            Some(q) => Some(q),
            None => self.scopes.owner_at(i).map(str::to_string),
        });

        self.push(FunctionSignature {
            name,
            owner,
            params,
            results,
            returns_error_like: false,
            span: keyword.span.to(&self.tokens[last].span),
        });
    }

    /// Name at `j`, possibly qualified (`self.name`, `Foo.bar`) or an
    /// operator (`==`, `[]=`). Returns the name, its qualifier and the index
    /// after it.
    fn header_name(&self, j: usize) -> Option<(String, Option<String>, usize)> {
        let rules = &self.grammar.functions;
        let first = self.get(j)?;

        if first.is_word() {
            let mut parts = vec![first.text];
            let mut separator = "";
            let mut k = j + 1;
            while let (Some(sep), Some(part)) = (self.get(k), self.get(k + 1)) {
                let is_qualifier = sep.kind == TokenKind::Punctuation && rules.qualifiers.iter().any(|q| q == sep.text);
                if is_qualifier && part.is_word() && adjacent(sep, part) {
                    separator = sep.text;
                    parts.push(part.text);
                    k += 2;
                } else {
                    break;
                }
            }
            let mut name = parts.pop().unwrap_or_default().to_string();
            // Setter methods: `def name=(value)`.
            if rules.operator_names
                && self.is_punct_at(k, "=")
                && self.is_punct_at(k + 1, "(")
                && adjacent(&self.tokens[k - 1], &self.tokens[k])
            {
                name.push('=');
                k += 1;
            }
            let qualifier = (!parts.is_empty()).then(|| parts.join(separator));
            return Some((name, qualifier, k));
        }

        if rules.operator_names && first.kind == TokenKind::Punctuation && !first.is_punct("(") {
            let mut name = String::new();
            let mut k = j;
            while let Some(t) = self.get(k) {
                let joined = k == j || adjacent(&self.tokens[k - 1], t);
                if t.kind == TokenKind::Punctuation && joined && !(t.is_punct("(") && k > j) {
                    name.push_str(t.text);
                    k += 1;
                } else {
                    break;
                }
            }
            return Some((name, None, k));
        }
        None
    }

    /// Name bound to an anonymous function: `f <- function(`, `f = function(`,
    /// `f: function(`.
    fn bound_name(&self, i: usize) -> Option<String> {
        let operators = &self.grammar.functions.assignment_operators;
        if operators.is_empty() {
            return None;
        }
        let mut k = i;
        while k > 0 && self.tokens[k - 1].is_word() && self.tokens[k - 1].text == "async" {
            k -= 1;
        }
        if k < 2 {
            return None;
        }
        let op = self.tokens[k - 1];
        if op.kind != TokenKind::Punctuation || !operators.iter().any(|o| o == op.text) {
            return None;
        }
        let target = self.tokens[k - 2];
        if target.is_word() {
            Some(target.text.to_string())
        } else if target.is_string() {
            Some(unquote(target.text).to_string()).filter(|s| !s.is_empty())
        } else {
            None
        }
    }

    /// Result types after the parameter list ending at `close`, and the index
    /// of the last header token.
    fn keyword_results(&self, close: usize) -> (Vec<String>, usize) {
        let rules = &self.grammar.functions;
        match &rules.results {
            ResultStyle::Trailing => {
                let (results, end) = trailing_results(self.tokens, close);
                (results, end.saturating_sub(1).max(close))
            }
            ResultStyle::Arrow { token } => {
                if !self.get(close + 1).map(|t| t.text == token.as_str()).unwrap_or(false) {
                    return (Vec::new(), close);
                }
                match annotated_result(self.tokens, close + 2, &[":", "{", ";"]) {
                    (Some(result), end) => (vec![result], end - 1),
                    (None, _) => (Vec::new(), close + 1),
                }
            }
            ResultStyle::AsClause => {
                let keyword = rules.type_keyword.as_deref().unwrap_or("As");
                let marker = self.get(close + 1).filter(|t| {
                    t.is_word()
                        && self.grammar.word_eq(t.text, keyword)
                        && t.span.line == self.tokens[close].span.end_line
                });
                if marker.is_none() {
                    return (Vec::new(), close);
                }
                match annotated_result(self.tokens, close + 2, &[]) {
                    (Some(result), end) => (vec![result], end - 1),
                    (None, _) => (Vec::new(), close + 1),
                }
            }
            ResultStyle::Prefix | ResultStyle::None => (Vec::new(), close),
        }
    }

    /// Shell: `name() {` or `name() (` at line start.
    fn line_start_definition(&mut self, i: usize) {
        let token = self.tokens[i];
        if token.kind != TokenKind::Identifier || !is_line_first(self.tokens, i) {
            return;
        }
        if !(self.is_punct_at(i + 1, "(") && self.is_punct_at(i + 2, ")")) {
            return;
        }
        if !(self.is_punct_at(i + 3, "{") || self.is_punct_at(i + 3, "(")) {
            return;
        }
        self.push(FunctionSignature {
            name: token.text.to_string(),
            owner: None,
            params: Vec::new(),
            results: Vec::new(),
            returns_error_like: false,
            span: token.span.to(&self.tokens[i + 2].span),
        });
    }

    /// Class body method without keyword: `name(args) {`.
    fn type_scope_definition(&mut self, i: usize) {
        let token = self.tokens[i];
        if token.kind != TokenKind::Identifier || !self.is_punct_at(i + 1, "(") {
            return;
        }
        let Some(owner) = self.scopes.owner_at(i) else {
            return;
        };
        if self.grammar.word_in(token.text, &self.grammar.functions.excluded_names)
            || follows_member_access(self.tokens, i)
            || self.preceded_by_excluded(i)
        {
            return;
        }
        let Some(close) = matching_close(self.tokens, i + 1, "(", ")") else {
            return;
        };
        if !self.is_punct_at(close + 1, "{") {
            return;
        }
        let params = parse_params(&self.tokens[i + 2..close], self.grammar);
        self.push(FunctionSignature {
            name: token.text.to_string(),
            owner: Some(owner.to_string()),
            params,
            results: Vec::new(),
            returns_error_like: false,
            span: token.span.to(&self.tokens[close].span),
        });
    }

    // ----- C-family headers ----------------------------------------------

    fn type_prefixed_headers(&mut self) {
        let mut i = 1;
        while i < self.tokens.len() {
            if self.tokens[i].is_punct("(") {
                if let Some(name_idx) = self.name_before_paren(i) {
                    if let Some(resume) = self.type_prefixed_header(name_idx, i) {
                        i = resume.max(i + 1);
                        continue;
                    }
                }
            }
            i += 1;
        }
    }

    /// Index of the name owning the `(` at `open`; skips generic arguments
    /// written after the name (`Parse<T>(`).
    fn name_before_paren(&self, open: usize) -> Option<usize> {
        if let Some(keyword) = self.operator_before_paren(open) {
            return Some(keyword);
        }
        let prev = &self.tokens[open - 1];
        if prev.kind == TokenKind::Identifier {
            return Some(open - 1);
        }
        if !self.grammar.functions.generics || !prev.is_punct(">") {
            return None;
        }
        let mut depth = 0i32;
        let mut k = open - 1;
        loop {
            let t = &self.tokens[k];
            if t.is_punct(">") {
                depth += 1;
            } else if t.is_punct("<") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else if !(t.is_word() || t.is_punct(",") || t.is_punct(".") || t.is_punct("?") || t.is_punct("[") || t.is_punct("]")) {
                return None;
            }
            if k == 0 {
                return None;
            }
            k -= 1;
        }
        (k > 0 && self.tokens[k - 1].kind == TokenKind::Identifier).then(|| k - 1)
    }

    /// Index of the operator keyword naming the `(` at `open`: `operator==(`,
    /// `operator()(`, `operator bool(`.
    fn operator_before_paren(&self, open: usize) -> Option<usize> {
        let keyword = self.grammar.functions.operator_keyword.as_deref()?;
        let limit = open.saturating_sub(4);
        let mut k = open;
        while k > limit {
            k -= 1;
            let t = &self.tokens[k];
            if t.is_word() && self.grammar.word_eq(t.text, keyword) {
                return (k + 1 < open).then_some(k);
            }
            if matches!(t.text, ";" | "{" | "}") {
                return None;
            }
        }
        None
    }

    /// Index of `marker` after the qualifiers that follow `close`
    /// (`const noexcept -> int`).
    fn trailing_marker(&self, close: usize, marker: &str) -> Option<usize> {
        let mut k = close + 1;
        while self.get(k).map(|t| t.is_word()).unwrap_or(false) {
            k += 1;
        }
        self.is_punct_at(k, marker).then_some(k)
    }

    /// Try to read a declaration whose name is at `name_idx` and whose
    /// parameter list opens at `open`. Returns where scanning resumes, or
    /// `None` if this is not a declaration.
    fn type_prefixed_header(&mut self, name_idx: usize, open: usize) -> Option<usize> {
        let grammar = self.grammar;
        let rules = &grammar.functions;
        let tokens = self.tokens;
        let name_token = self.tokens[name_idx];
        if self.grammar.word_in(name_token.text, &rules.excluded_names) {
            return None;
        }

        let is_operator = rules
            .operator_keyword
            .as_deref()
            .map(|k| self.grammar.word_eq(name_token.text, k))
            .unwrap_or(false);

        let mut start = name_idx;
        let mut name = if is_operator {
            join(&tokens[name_idx..open])
        } else {
            name_token.text.to_string()
        };
        let mut qualifier: Option<String> = None;
        if start > 0 && self.tokens[start - 1].is_punct("~") {
            name.insert(0, '~');
            start -= 1;
        }
        let is_qualifier = |t: &Token| t.kind == TokenKind::Punctuation && rules.qualifiers.iter().any(|q| q == t.text);
        if start >= 2 && is_qualifier(&self.tokens[start - 1]) && self.tokens[start - 2].is_word() {
            qualifier = Some(self.tokens[start - 2].text.to_string());
            start -= 2;
            while start >= 2 && is_qualifier(&self.tokens[start - 1]) && self.tokens[start - 2].is_word() {
                start -= 2;
            }
        }
        // Member calls and annotations (`@Table(name = "t")`).
        if follows_member_access(tokens, start) || (start > 0 && tokens[start - 1].is_punct("@")) {
            return None;
        }

        let prefix_start = self.prefix_start(start)?;
        let prefix = &tokens[prefix_start..start];
        if !self.valid_prefix(prefix) {
            return None;
        }
        let mut results = self.prefix_results(prefix);
        // Conversion operators name their result: `operator bool()`.
        if is_operator && results.is_empty() && tokens[name_idx + 1].is_word() {
            results = vec![join(&tokens[name_idx + 1..open])];
        }
        let has_prefix = prefix.iter().any(|t| t.is_word());

        let Some(close) = matching_close(self.tokens, open, "(", ")") else {
            if has_prefix {
                self.malformed(name_token.span, format!("unterminated parameter list of '{}'", name));
                return Some(self.tokens.len());
            }
            return None;
        };

        let in_type = self.scopes.owner_at(name_idx).is_some();
        let end = self.header_end(close + 1)?;
        if let Some(marker) = rules.trailing_result.as_deref() {
            if let Some(at) = self.trailing_marker(close, marker) {
                if let (Some(result), _) = annotated_result(tokens, at + 1, &["{", ";", "=", "=>"]) {
                    results = vec![result];
                }
            }
        }
        let resume = match end {
            HeaderEnd::Prototype(at) => {
                if !has_prefix && !in_type {
                    return None;
                }
                at + 1
            }
            HeaderEnd::Body(at) => matching_close(self.tokens, at, "{", "}")
                .map(|c| c + 1)
                .unwrap_or(self.tokens.len()),
            HeaderEnd::Expression(at) => (at..self.tokens.len())
                .find(|&k| self.tokens[k].is_punct(";"))
                .map(|k| k + 1)
                .unwrap_or(self.tokens.len()),
        };

        let params = parse_params(&self.tokens[open + 1..close], self.grammar);
        let owner = qualifier.or_else(|| self.scopes.owner_at(name_idx).map(str::to_string));
        let is_constructor = name.starts_with('~') || owner.as_deref() == Some(name.as_str());
        let first = self.tokens[prefix_start.min(start)];
        self.push(FunctionSignature {
            name,
            owner,
            params,
            results: if is_constructor { Vec::new() } else { results },
            returns_error_like: false,
            span: first.span.to(&self.tokens[close].span),
        });
        Some(resume)
    }

    /// Walk back from `start` to the beginning of the declaration prefix.
    fn prefix_start(&self, start: usize) -> Option<usize> {
        let mut k = start;
        while k > 0 {
            let t = &self.tokens[k - 1];
            if t.kind == TokenKind::Directive {
                break;
            }
            if t.kind == TokenKind::Punctuation {
                match t.text {
                    ";" | "{" | "}" | ")" | ":" => break,
                    "]" => {
                        // `[]` is an array type; `[Attr]` ends the prefix.
                        if k >= 2 && self.tokens[k - 2].is_punct("[") {
                            k -= 2;
                            continue;
                        }
                        break;
                    }
                    _ => {}
                }
            }
            k -= 1;
            if start - k > MAX_PREFIX {
                return None;
            }
        }
        Some(k)
    }

    fn valid_prefix(&self, prefix: &[Token]) -> bool {
        let rules = &self.grammar.functions;
        // `[Attr(...)]` rather than a type.
        if prefix.first().map(|t| t.is_punct("[")).unwrap_or(false) {
            return false;
        }
        let mut angle = 0i32;
        for token in prefix {
            let ok = match token.kind {
                TokenKind::Identifier | TokenKind::Keyword => {
                    !self.grammar.word_in(token.text, &rules.excluded_predecessors)
                        && !self.grammar.word_in(token.text, &rules.excluded_names)
                }
                TokenKind::String => true,
                TokenKind::Punctuation => match token.text {
                    "<" if rules.generics => {
                        angle += 1;
                        true
                    }
                    ">" if rules.generics => {
                        angle -= 1;
                        true
                    }
                    ">>" if rules.generics => {
                        angle -= 2;
                        true
                    }
                    "," => angle > 0,
                    t => PREFIX_PUNCTUATION.contains(&t),
                },
                _ => false,
            };
            if !ok {
                return false;
            }
        }
        angle == 0
    }

    /// Return type from a declaration prefix: modifiers, annotations,
    /// linkage strings and leading type parameter lists are dropped.
    fn prefix_results(&self, prefix: &[Token]) -> Vec<String> {
        let rules = &self.grammar.functions;
        let mut kept: Vec<Token> = Vec::new();
        let mut i = 0;
        while i < prefix.len() {
            let token = prefix[i];
            if token.is_punct("@") {
                i += 1;
                while i < prefix.len() && (prefix[i].is_word() || prefix[i].is_punct(".")) {
                    i += 1;
                }
                continue;
            }
            if token.is_word() && token.text == "template" {
                i += 1;
                if i < prefix.len() && prefix[i].is_punct("<") {
                    i = skip_angles(prefix, i);
                }
                continue;
            }
            if kept.is_empty() && token.is_punct("<") {
                i = skip_angles(prefix, i);
                continue;
            }
            if token.is_string() || (token.is_word() && self.grammar.word_in(token.text, &rules.modifiers)) {
                i += 1;
                continue;
            }
            kept.push(token);
            i += 1;
        }
        let result = join(&kept);
        if result.is_empty() || result == "void" {
            Vec::new()
        } else {
            vec![result]
        }
    }

    /// Classify what follows a parameter list: a body, an expression body, a
    /// prototype `;`, or something that is not a declaration.
    fn header_end(&self, mut j: usize) -> Option<HeaderEnd> {
        loop {
            let t = self.get(j)?;
            match t.kind {
                TokenKind::Identifier => {
                    // Another call or header begins: this was not a declaration.
                    if self.is_punct_at(j + 1, "(") {
                        return None;
                    }
                    j += 1;
                }
                TokenKind::Keyword => {
                    // `[Attr("x")] public class Foo {` is not a header.
                    if self.grammar.word_in(t.text, &self.grammar.functions.type_keywords) {
                        return None;
                    }
                    j += 1;
                }
                TokenKind::Punctuation => match t.text {
                    "{" => return Some(HeaderEnd::Body(j)),
                    ";" => return Some(HeaderEnd::Prototype(j)),
                    "=>" => return Some(HeaderEnd::Expression(j)),
                    "=" => {
                        let pure = self
                            .get(j + 1)
                            .map(|n| matches!(n.text, "0" | "default" | "delete"))
                            .unwrap_or(false);
                        if pure && self.is_punct_at(j + 2, ";") {
                            return Some(HeaderEnd::Prototype(j + 2));
                        }
                        return None;
                    }
                    ":" => {
                        // Initializer list or base constructor call.
                        let mut depth = 0i32;
                        j += 1;
                        while let Some(t) = self.get(j) {
                            match t.text {
                                "(" => depth += 1,
                                ")" => depth -= 1,
                                "{" | ";" if depth <= 0 => break,
                                _ => {}
                            }
                            j += 1;
                        }
                    }
                    "(" => j = matching_close(self.tokens, j, "(", ")")? + 1,
                    text if QUALIFIER_PUNCTUATION.contains(&text) => j += 1,
                    _ => return None,
                },
                _ => return None,
            }
        }
    }
}

/// Index after the `<...>` group opening at `open`.
fn skip_angles(tokens: &[Token], open: usize) -> usize {
    let mut depth = 0i32;
    for (k, t) in tokens.iter().enumerate().skip(open) {
        match t.text {
            "<" => depth += 1,
            ">" => depth -= 1,
            ">>" => depth -= 2,
            _ => {}
        }
        if depth <= 0 {
            return k + 1;
        }
    }
    tokens.len()
}

/// Receiver type name from `c *Client`, `(*Client)`, `s Stack[T]`.
fn receiver_type(tokens: &[Token]) -> Option<String> {
    let mut depth = 0i32;
    let mut found = None;
    for token in tokens {
        match token.text {
            "[" => depth += 1,
            "]" => depth -= 1,
            _ if depth == 0 && token.kind == TokenKind::Identifier => found = Some(token.text),
            _ => {}
        }
    }
    found.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Parameter;
    use crate::parser::{languages, tokenize};

    fn functions(src: &str, grammar: &Grammar) -> Extraction<FunctionSignature> {
        let stream = tokenize(src.as_bytes(), grammar).unwrap();
        extract_functions(&stream, grammar)
    }

    fn names(src: &str, grammar: &Grammar) -> Vec<String> {
        functions(src, grammar)
            .items
            .into_iter()
            .map(|f| f.qualified_name())
            .collect()
    }

    #[test]
    fn test_go_receiver_method() {
        let go = languages::go::grammar();
        let src = "func (c *Client) MakeRpc(rpcName string, fptr interface{}) (err error) {\n\treturn nil\n}\n";
        let result = functions(src, &go);
        assert_eq!(result.items.len(), 1);
        let f = &result.items[0];
        assert_eq!(f.name, "MakeRpc");
        assert_eq!(f.owner.as_deref(), Some("Client"));
        assert_eq!(
            f.params,
            vec![Parameter::new("rpcName", "string"), Parameter::new("fptr", "interface{}")]
        );
        assert_eq!(f.results, vec!["error"]);
        assert!(f.returns_error_like);
    }

    #[test]
    fn test_go_zero_results() {
        let go = languages::go::grammar();
        let result = functions("func pcheck(e error) {\n\tif e != nil {\n\t\tpanic(e)\n\t}\n}\n", &go);
        let f = &result.items[0];
        assert!(f.results.is_empty());
        assert!(!f.returns_error_like);
    }

    #[test]
    fn test_go_anonymous_functions_skipped() {
        let go = languages::go::grammar();
        let src = "func run() {\n\tgo func() {}()\n\tdefer func(x int) { _ = x }(1)\n}\n";
        assert_eq!(names(src, &go), vec!["run"]);
    }

    #[test]
    fn test_go_local_error_type() {
        let go = languages::go::grammar();
        let src = "type ParseError struct{}\nfunc (p *ParseError) Error() string { return \"\" }\nfunc parse() *ParseError { return nil }\nfunc count() int { return 0 }\n";
        let result = functions(src, &go);
        assert!(result.items.iter().find(|f| f.name == "parse").unwrap().returns_error_like);
        assert!(!result.items.iter().find(|f| f.name == "count").unwrap().returns_error_like);
    }

    #[test]
    fn test_go_missing_name_diagnosed() {
        let go = languages::go::grammar();
        let result = functions("func 42() {}\nfunc ok() {}\n", &go);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "ok");
    }

    #[test]
    fn test_go_unterminated_receiver_diagnosed() {
        let go = languages::go::grammar();
        let result = functions("func (\n", &go);
        assert!(result.items.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("unterminated"));

        let result = functions("func (c *Client\n", &go);
        assert!(result.items.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_go_multiline_results_with_trailing_comma() {
        let go = languages::go::grammar();
        let src = "func K(\n\ta int,\n\tb string,\n) (\n\tint,\n\terror,\n) {\n}\n";
        let result = functions(src, &go);
        assert_eq!(result.items.len(), 1);
        let f = &result.items[0];
        assert_eq!(f.params, vec![Parameter::new("a", "int"), Parameter::new("b", "string")]);
        assert_eq!(f.results, vec!["int", "error"]);
        assert!(f.returns_error_like);
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let go = languages::go::grammar();
        let src = "func (s *S) Do() {}\nfunc (s *S) Do() error { return nil }\n";
        let result = functions(src, &go);
        assert_eq!(result.items.len(), 2);
        assert!(!result.items[0].returns_error_like);
        assert!(result.items[1].returns_error_like);
    }

    #[test]
    fn test_c_prototypes_and_definitions() {
        let c = languages::c::grammar();
        let src = "static inline long div_round_up (long n, long d) { return (n + d - 1) / d; }\nint helper(int);\nvoid run(void) { helper(3); if (x) { call(y); } }\n";
        let result = functions(src, &c);
        let names: Vec<_> = result.items.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["div_round_up", "helper", "run"]);
        assert_eq!(result.items[0].results, vec!["long"]);
        assert_eq!(result.items[1].params, vec![Parameter::new("", "int")]);
        assert!(result.items[2].results.is_empty());
    }

    #[test]
    fn test_cpp_qualified_and_destructor() {
        let cpp = languages::cpp::grammar();
        let src = "std::vector<int> Foo::items(int n) const { return {}; }\nFoo::~Foo() {}\nclass Bar {\npublic:\n  virtual int size() const = 0;\n  Bar(int x) : x_(x) {}\n};\n";
        let result = functions(src, &cpp);
        let names: Vec<_> = result.items.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["Foo.items", "Foo.~Foo", "Bar.size", "Bar.Bar"]);
        assert_eq!(result.items[0].results, vec!["std::vector<int>"]);
        assert!(result.items[3].results.is_empty());
    }

    #[test]
    fn test_cpp_trailing_return_and_operators() {
        let cpp = languages::cpp::grammar();
        let src = "auto f() -> int { return 1; }\nauto g(int n) const noexcept -> std::vector<int>;\nclass Flag {\npublic:\n  operator bool() const;\n  bool operator==(const Flag& other) const { return true; }\n  void operator()(int x);\n};\n";
        let result = functions(src, &cpp);
        let names: Vec<_> = result.items.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(
            names,
            vec!["f", "g", "Flag.operator bool", "Flag.operator==", "Flag.operator()"]
        );
        assert_eq!(result.items[0].results, vec!["int"]);
        assert_eq!(result.items[1].results, vec!["std::vector<int>"]);
        assert_eq!(result.items[2].results, vec!["bool"]);
        assert_eq!(result.items[3].results, vec!["bool"]);
        assert_eq!(result.items[3].params, vec![Parameter::new("other", "const Flag&")]);
        assert!(result.items[4].results.is_empty());
    }

    #[test]
    fn test_java_methods_and_exceptions() {
        let java = languages::java::grammar();
        let src = "public class Api {\n  @Override\n  public String toString() { return name(); }\n  public static void main(final String[] args) throws IOException {\n    new Thread(() -> run()).start();\n  }\n  private IOException failure(int code) { return null; }\n}\n";
        let result = functions(src, &java);
        let names: Vec<_> = result.items.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["Api.toString", "Api.main", "Api.failure"]);
        assert_eq!(result.items[0].results, vec!["String"]);
        assert!(result.items[1].results.is_empty());
        assert!(result.items[2].returns_error_like);
    }

    #[test]
    fn test_python_methods() {
        let py = languages::python::grammar();
        let src = "class sim_helper(object):\n    def __init__(self,L,fN,u):\n        self.L = L\n\n    def sweep(self) -> Dict[str, int]:\n        pass\n\ndef main():\n    pass\n";
        let result = functions(src, &py);
        let names: Vec<_> = result.items.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["sim_helper.__init__", "sim_helper.sweep", "main"]);
        assert_eq!(result.items[0].param_count(), 4);
        assert_eq!(result.items[1].results, vec!["Dict[str, int]"]);
    }

    #[test]
    fn test_ruby_self_methods_and_operators() {
        let ruby = languages::ruby::grammar();
        let src = "module Sortable\n  def self.included(base)\n    base.extend(ClassMethods)\n  end\n  def ==(other)\n  end\n  def name=(value)\n  end\n  def empty?\n  end\nend\n";
        let names = names(src, &ruby);
        assert_eq!(
            names,
            vec!["Sortable.included", "Sortable.==", "Sortable.name=", "Sortable.empty?"]
        );
    }

    #[test]
    fn test_javascript_bound_and_class_methods() {
        let js = languages::javascript::grammar();
        let src = "function codebotBootstrap(theAppConfig) {\n  const helper = function(x) { return x; };\n  [1].map(function(y) { return y; });\n}\nclass Store {\n  constructor(db) { this.db = db; }\n  get(key) { if (key) { return this.db.get(key); } }\n}\n";
        assert_eq!(
            names(src, &js),
            vec!["codebotBootstrap", "helper", "Store.constructor", "Store.get"]
        );
    }

    #[test]
    fn test_r_assignment_functions() {
        let r = languages::r::grammar();
        let src = "square <- function(x) {\n  x * x\n}\nadd = function(a, b = 2) a + b\nlapply(xs, function(v) v)\n";
        let result = functions(src, &r);
        let names: Vec<_> = result.items.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["square", "add"]);
        assert_eq!(result.items[1].params.len(), 2);
    }

    #[test]
    fn test_bash_definitions() {
        let bash = languages::bash::grammar();
        let src = "#!/bin/bash\nfunction setup {\n  echo hi\n}\ncleanup() {\n  rm -f x\n}\nfunction build() {\n  make\n}\n";
        assert_eq!(names(src, &bash), vec!["setup", "cleanup", "build"]);
    }

    #[test]
    fn test_vb_functions_and_subs() {
        let vb = languages::vb::grammar();
        let src = "Public Class Calc\n    Public Function Add(ByVal a As Integer, ByVal b As Integer) As Integer\n        Return a + b\n    End Function\n    Sub Reset()\n        Exit Sub\n    End Sub\nEnd Class\n";
        let result = functions(src, &vb);
        let names: Vec<_> = result.items.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["Calc.Add", "Calc.Reset"]);
        assert_eq!(result.items[0].results, vec!["Integer"]);
        assert_eq!(result.items[0].params.len(), 2);
        assert!(result.items[1].results.is_empty());
    }

    #[test]
    fn test_csharp_constructor_base_call() {
        let cs = languages::csharp::grammar();
        let src = "namespace App {\n  [Serializable]\n  public class AppException : Exception {\n    public AppException(string msg) : base(msg) { }\n    public T Parse<T>(string raw) where T : new() { return new T(); }\n    public Exception Wrap() => new AppException(\"x\");\n  }\n}\n";
        let result = functions(src, &cs);
        let names: Vec<_> = result.items.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(
            names,
            vec!["AppException.AppException", "AppException.Parse", "AppException.Wrap"]
        );
        assert!(result.items[0].results.is_empty());
        assert_eq!(result.items[1].results, vec!["T"]);
        assert!(result.items[2].returns_error_like);
    }
}

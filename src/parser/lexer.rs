//! Grammar-driven lexical preprocessor.
//!
//! Turns raw bytes into a [`TokenStream`] where comments, string literals and
//! preprocessor lines are single opaque tokens, so the extractors never see
//! keywords hidden inside them.

use std::collections::HashSet;

use serde::Serialize;

use crate::analysis::Span;
use crate::error::{Result, ScanError};
use crate::parser::grammar::{Grammar, StringRule};

const BOM: &str = "\u{feff}";

/// Punctuation after which a `/` starts a regex literal rather than a division.
const REGEX_PRECEDERS: &[char] = &[
    '(', ',', '=', ':', '[', '!', '&', '|', '?', '{', '}', ';', '+', '-', '*', '%', '<', '>', '~',
    '^',
];

/// Keywords after which a `/` starts a regex literal.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "in", "of", "new", "delete", "void", "throw", "instanceof",
];

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Punctuation,
    Number,
    String,
    Comment,
    Directive,
}

/// A lexical token borrowing its text from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    /// Identifier or keyword.
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Keyword)
    }

    /// Punctuation with exactly this text.
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    pub fn is_string(&self) -> bool {
        self.kind == TokenKind::String
    }
}

/// All tokens of one file, in source order.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    truncated: bool,
}

impl<'a> TokenStream<'a> {
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// An unterminated comment or string literal was cut off by end of file.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Tokens with comments removed. This is the view the extractors scan.
    pub fn code_tokens(&self) -> Vec<Token<'a>> {
        self.tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .copied()
            .collect()
    }

    /// Whether a byte offset lies inside a comment token.
    pub fn is_in_comment(&self, offset: usize) -> bool {
        let idx = self.tokens.partition_point(|t| t.span.end <= offset);
        self.tokens
            .get(idx)
            .map(|t| t.kind == TokenKind::Comment && t.span.contains(offset))
            .unwrap_or(false)
    }
}

/// Tokenize `bytes` with the rules of `grammar`.
pub fn tokenize<'a>(bytes: &'a [u8], grammar: &Grammar) -> Result<TokenStream<'a>> {
    let source = std::str::from_utf8(bytes).map_err(|e| ScanError::MalformedEncoding {
        offset: e.valid_up_to(),
    })?;
    let mut lexer = Lexer::new(source, grammar);
    lexer.run();
    Ok(TokenStream {
        source,
        tokens: lexer.tokens,
        truncated: lexer.truncated,
    })
}

struct Lexer<'a, 'g> {
    src: &'a str,
    grammar: &'g Grammar,
    keywords: HashSet<String>,
    strings: Vec<&'g StringRule>,
    operators: Vec<&'g str>,
    content_start: usize,
    pos: usize,
    line: usize,
    col: usize,
    /// Non-blank text has already been seen on the current line.
    line_has_content: bool,
    tokens: Vec<Token<'a>>,
    truncated: bool,
}

impl<'a, 'g> Lexer<'a, 'g> {
    fn new(src: &'a str, grammar: &'g Grammar) -> Self {
        let mut strings: Vec<&StringRule> = grammar.lexical.strings.iter().collect();
        strings.sort_by(|a, b| b.open.len().cmp(&a.open.len()));
        let mut operators: Vec<&str> = grammar.lexical.operators.iter().map(String::as_str).collect();
        operators.sort_by(|a, b| b.len().cmp(&a.len()));

        let content_start = if src.starts_with(BOM) { BOM.len() } else { 0 };
        Self {
            src,
            grammar,
            keywords: grammar.keyword_set(),
            strings,
            operators,
            content_start,
            pos: content_start,
            line: 1,
            col: 1,
            line_has_content: false,
            tokens: Vec::new(),
            truncated: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn prev_char(&self) -> Option<char> {
        self.src[..self.pos].chars().next_back()
    }

    /// Move to `end`, keeping line and column in sync.
    fn bump_to(&mut self, end: usize) {
        for ch in self.src[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos = end;
    }

    fn emit(&mut self, kind: TokenKind, end: usize) {
        let start = self.pos;
        let (line, column) = (self.line, self.col);
        self.bump_to(end);
        let text = &self.src[start..end];
        let end_line = if text.ends_with('\n') {
            self.line - 1
        } else {
            self.line
        };
        self.tokens.push(Token {
            kind,
            text,
            span: Span {
                start,
                end,
                line,
                column,
                end_line,
            },
        });
        self.line_has_content = true;
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                self.bump_to(self.pos + 1);
                self.line_has_content = false;
                continue;
            }
            if c.is_whitespace() {
                self.bump_to(self.pos + c.len_utf8());
                continue;
            }

            if self.pos == self.content_start && self.rest().starts_with("#!") {
                let end = self.line_end(self.pos);
                self.emit(TokenKind::Comment, end);
            } else if let Some(end) = self.directive() {
                self.emit(TokenKind::Directive, end);
            } else if let Some(end) = self.line_comment() {
                self.emit(TokenKind::Comment, end);
            } else if let Some((end, closed)) = self.block_comment() {
                self.truncated |= !closed;
                self.emit(TokenKind::Comment, end);
            } else if let Some((end, closed)) = self.string_literal() {
                self.truncated |= !closed;
                self.emit(TokenKind::String, end);
            } else if let Some(end) = self.regex_literal() {
                self.emit(TokenKind::String, end);
            } else if c.is_ascii_digit() {
                let end = self.scan_while(self.pos, |ch| ch.is_alphanumeric() || ch == '_' || ch == '.');
                self.emit(TokenKind::Number, end);
            } else if self.is_ident_start(c) {
                let end = self.identifier_end();
                let kind = if self.is_keyword(&self.src[self.pos..end]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                self.emit(kind, end);
            } else {
                let end = self
                    .operators
                    .iter()
                    .find(|op| self.rest().starts_with(**op))
                    .map(|op| self.pos + op.len())
                    .unwrap_or(self.pos + c.len_utf8());
                self.emit(TokenKind::Punctuation, end);
            }
        }
    }

    fn line_end(&self, from: usize) -> usize {
        self.src[from..]
            .find('\n')
            .map(|i| from + i)
            .unwrap_or(self.src.len())
    }

    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        self.src[from..]
            .char_indices()
            .find(|(_, ch)| !pred(*ch))
            .map(|(i, _)| from + i)
            .unwrap_or(self.src.len())
    }

    fn is_ident_start(&self, c: char) -> bool {
        c.is_alphabetic() || c == '_' || self.grammar.lexical.identifier_chars.contains(c)
    }

    fn is_ident_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || self.grammar.lexical.identifier_chars.contains(c)
    }

    fn identifier_end(&self) -> usize {
        let first = self.peek().map(char::len_utf8).unwrap_or(0);
        let end = self.scan_while(self.pos + first, |ch| self.is_ident_char(ch));
        let mut tail = self.src[end..].chars();
        match (tail.next(), tail.next()) {
            (Some(s), next) if self.grammar.lexical.identifier_suffixes.contains(s) && next != Some('=') => {
                end + s.len_utf8()
            }
            _ => end,
        }
    }

    fn is_keyword(&self, word: &str) -> bool {
        if self.grammar.lexical.case_insensitive {
            self.keywords.contains(&word.to_ascii_lowercase())
        } else {
            self.keywords.contains(word)
        }
    }

    fn directive(&self) -> Option<usize> {
        let prefix = self.grammar.lexical.directive_prefix?;
        if self.line_has_content || self.peek() != Some(prefix) {
            return None;
        }
        let mut end = self.line_end(self.pos);
        while self.src[..end].trim_end().ends_with('\\') && end < self.src.len() {
            end = self.line_end(end + 1);
        }
        Some(end)
    }

    fn line_comment(&self) -> Option<usize> {
        let lex = &self.grammar.lexical;
        let rest = self.rest();
        for marker in &lex.line_comments {
            let alphabetic = marker.chars().all(char::is_alphabetic);
            let matched = match rest.get(..marker.len()) {
                Some(head) if alphabetic && lex.case_insensitive => head.eq_ignore_ascii_case(marker),
                Some(head) => head == marker,
                None => false,
            };
            if !matched {
                continue;
            }
            if alphabetic {
                let before_ok = self.prev_char().map(|p| !self.is_ident_char(p)).unwrap_or(true);
                let after_ok = rest[marker.len()..]
                    .chars()
                    .next()
                    .map(|n| !self.is_ident_char(n))
                    .unwrap_or(true);
                if !(before_ok && after_ok) {
                    continue;
                }
            }
            if lex.line_comment_word_start {
                let starts_word = self
                    .prev_char()
                    .map(|p| p.is_whitespace() || matches!(p, ';' | '|' | '&' | '(' | ')'))
                    .unwrap_or(true);
                if !starts_word {
                    continue;
                }
            }
            return Some(self.line_end(self.pos));
        }
        None
    }

    fn block_comment(&self) -> Option<(usize, bool)> {
        let rest = self.rest();
        for delims in &self.grammar.lexical.block_comments {
            if delims.line_start && self.line_has_content {
                continue;
            }
            if !rest.starts_with(delims.open.as_str()) {
                continue;
            }
            let body = self.pos + delims.open.len();
            if delims.line_start {
                let needle = format!("\n{}", delims.close);
                return Some(match self.src[body..].find(&needle) {
                    Some(i) => (self.line_end(body + i + 1), true),
                    None => (self.src.len(), false),
                });
            }
            return Some(match self.src[body..].find(delims.close.as_str()) {
                Some(i) => (body + i + delims.close.len(), true),
                None => (self.src.len(), false),
            });
        }
        None
    }

    fn string_literal(&self) -> Option<(usize, bool)> {
        let rest = self.rest();
        let rule = self.strings.iter().find(|r| rest.starts_with(r.open.as_str()))?;
        let close = rule.close.as_str();
        let mut i = self.pos + rule.open.len();
        loop {
            let tail = &self.src[i..];
            let Some(ch) = tail.chars().next() else {
                return Some((self.src.len(), false));
            };
            if Some(ch) == rule.escape {
                i += ch.len_utf8();
                if let Some(next) = self.src[i..].chars().next() {
                    i += next.len_utf8();
                }
                continue;
            }
            if tail.starts_with(close) {
                let after = i + close.len();
                if rule.doubled_close && self.src[after..].starts_with(close) {
                    i = after + close.len();
                    continue;
                }
                return Some((after, true));
            }
            i += ch.len_utf8();
        }
    }

    fn regex_literal(&self) -> Option<usize> {
        if !self.grammar.lexical.regex_literals || self.peek() != Some('/') {
            return None;
        }
        let allowed = match self.tokens.iter().rev().find(|t| t.kind != TokenKind::Comment) {
            None => true,
            Some(t) if t.kind == TokenKind::Punctuation => t
                .text
                .chars()
                .last()
                .map(|ch| REGEX_PRECEDERS.contains(&ch))
                .unwrap_or(false),
            Some(t) if t.kind == TokenKind::Keyword => REGEX_KEYWORDS.contains(&t.text),
            Some(_) => false,
        };
        if !allowed {
            return None;
        }

        let mut in_class = false;
        let mut chars = self.src[self.pos + 1..].char_indices();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '\n' => return None,
                '\\' => {
                    if chars.next().map(|(_, n)| n == '\n').unwrap_or(true) {
                        return None;
                    }
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => {
                    let body_end = self.pos + 1 + i + 1;
                    return Some(self.scan_while(body_end, |f| f.is_ascii_alphabetic()));
                }
                _ => {}
            }
        }
        None
    }
}

//! Small helpers over comment-free token slices shared by the extractors.

use crate::parser::{Token, TokenKind};

/// Member access operators; a keyword right after one is a field or method.
const MEMBER_ACCESS: &[&str] = &[".", "->", "::", "?."];

/// First code token on its line.
pub(crate) fn is_line_first(tokens: &[Token], i: usize) -> bool {
    i == 0 || tokens[i - 1].span.end_line < tokens[i].span.line
}

/// Token `i` can start a statement: first on its line or after `;`, `{`, `}`.
pub(crate) fn starts_statement(tokens: &[Token], i: usize) -> bool {
    if is_line_first(tokens, i) {
        return true;
    }
    let prev = &tokens[i - 1];
    prev.kind == TokenKind::Directive || matches!(prev.text, ";" | "{" | "}")
}

pub(crate) fn follows_member_access(tokens: &[Token], i: usize) -> bool {
    i > 0 && tokens[i - 1].kind == TokenKind::Punctuation && MEMBER_ACCESS.contains(&tokens[i - 1].text)
}

/// Two tokens with no whitespace between them.
pub(crate) fn adjacent(a: &Token, b: &Token) -> bool {
    a.span.end == b.span.start
}

/// Text of a string literal token without prefixes and quotes.
pub(crate) fn unquote(text: &str) -> &str {
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '@' || c == '$');
    let Some(quote) = body.chars().next() else {
        return body;
    };
    if !matches!(quote, '"' | '\'' | '`' | '/') {
        return body;
    }
    let tripled: String = std::iter::repeat(quote).take(3).collect();
    let width = if body.len() >= 6 && body.starts_with(&tripled) && body.ends_with(&tripled) {
        3
    } else {
        1
    };
    let q = quote.len_utf8() * width;
    if body.len() >= 2 * q && body.ends_with(quote) {
        &body[q..body.len() - q]
    } else {
        &body[q.min(body.len())..]
    }
}

/// Join token texts, keeping one space wherever the source had whitespace.
pub(crate) fn join(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            if !adjacent(p, token) {
                out.push(' ');
            }
        }
        out.push_str(token.text);
        prev = Some(token);
    }
    out
}

/// Index of the token closing the bracket opened at `open_idx`.
pub(crate) fn matching_close(tokens: &[Token], open_idx: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, token) in tokens[open_idx..].iter().enumerate() {
        if token.kind != TokenKind::Punctuation {
            continue;
        }
        if token.text == open {
            depth += 1;
        } else if token.text == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(open_idx + offset);
            }
        }
    }
    None
}

/// Split `tokens` on top-level commas, tracking `()`, `[]`, `{}` and
/// optionally `<>` nesting.
pub(crate) fn split_top_level<'t, 'a>(tokens: &'t [Token<'a>], angles: bool) -> Vec<&'t [Token<'a>]> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Punctuation {
            continue;
        }
        match token.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            "<" if angles => depth += 1,
            ">" if angles => depth -= 1,
            ">>" if angles => depth -= 2,
            "," if depth <= 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() || !parts.is_empty() {
        parts.push(&tokens[start..]);
    }
    parts
}

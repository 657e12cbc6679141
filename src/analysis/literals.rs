//! Comment and string literal records.
//!
//! The lexer already isolates both as single tokens; these helpers copy
//! them out of the stream in source order.

use crate::analysis::facts::TextRecord;
use crate::parser::{Token, TokenKind, TokenStream};

fn records(stream: &TokenStream, kind: TokenKind) -> Vec<TextRecord> {
    stream
        .tokens()
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t: &Token| TextRecord {
            text: t.text.to_string(),
            span: t.span,
        })
        .collect()
}

/// Line and block comments, delimiters included.
pub fn extract_comments(stream: &TokenStream) -> Vec<TextRecord> {
    records(stream, TokenKind::Comment)
}

/// String, character and regex literals, quotes and prefixes included.
pub fn extract_strings(stream: &TokenStream) -> Vec<TextRecord> {
    records(stream, TokenKind::String)
}

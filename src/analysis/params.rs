//! Parameter list and result type parsing for each parameter style.

use crate::analysis::facts::Parameter;
use crate::analysis::tokens::{join, matching_close, split_top_level};
use crate::parser::grammar::{Grammar, ParamStyle};
use crate::parser::{Token, TokenKind};

/// Parse the tokens between the parentheses of a parameter list.
pub(crate) fn parse_params(tokens: &[Token], grammar: &Grammar) -> Vec<Parameter> {
    let rules = &grammar.functions;
    let segments = split_top_level(tokens, rules.generics);
    let params: Vec<Parameter> = match rules.params {
        ParamStyle::NameThenType => name_then_type(&segments),
        ParamStyle::TypeThenName => {
            if segments.len() == 1 && segments[0].len() == 1 && segments[0][0].text == "void" {
                return Vec::new();
            }
            segments.iter().map(|s| type_then_name(s, grammar)).collect()
        }
        ParamStyle::NameColonType => segments.iter().filter_map(|s| name_colon_type(s)).collect(),
        ParamStyle::NameOnly => segments
            .iter()
            .map(|s| Parameter::new(join(before_default(s, &["=", ":"])), ""))
            .collect(),
        ParamStyle::NameAsType => segments.iter().map(|s| name_as_type(s, grammar)).collect(),
    };
    params
        .into_iter()
        .filter(|p| !p.name.is_empty() || !p.type_name.is_empty())
        .collect()
}

/// Tokens of a segment up to a top-level default marker.
fn before_default<'t, 'a>(segment: &'t [Token<'a>], markers: &[&str]) -> &'t [Token<'a>] {
    let mut depth = 0i32;
    for (i, token) in segment.iter().enumerate() {
        if token.kind != TokenKind::Punctuation {
            continue;
        }
        match token.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth -= 1,
            t if depth == 0 && markers.contains(&t) => return &segment[..i],
            _ => {}
        }
    }
    segment
}

/// A Go segment whose first token names the parameter: `a int`, `args ...T`.
fn is_named_segment(segment: &[Token]) -> bool {
    segment.len() >= 2 && segment[0].kind == TokenKind::Identifier && !segment[1].is_punct(".")
}

/// Go-style lists: `a, b int, c string`, or unnamed `int, string`.
fn name_then_type(segments: &[&[Token]]) -> Vec<Parameter> {
    // gofmt leaves a trailing comma on multi-line lists.
    let segments: Vec<&[Token]> = segments.iter().copied().filter(|s| !s.is_empty()).collect();
    if !segments.iter().any(|s| is_named_segment(s)) {
        return segments
            .iter()
            .map(|s| Parameter::new("", join(s)))
            .collect();
    }

    let mut params = Vec::new();
    let mut untyped: Vec<usize> = Vec::new();
    for segment in &segments {
        if is_named_segment(segment) {
            let type_name = join(&segment[1..]);
            for idx in untyped.drain(..) {
                let p: &mut Parameter = &mut params[idx];
                p.type_name = type_name.clone();
            }
            params.push(Parameter::new(segment[0].text, type_name));
        } else if let Some(first) = segment.first() {
            untyped.push(params.len());
            params.push(Parameter::new(first.text, ""));
        }
    }
    params
}

/// C-family parameter: `const char *name`, `int[] xs`, `void (*cb)(int)`, `int`.
fn type_then_name(segment: &[Token], grammar: &Grammar) -> Parameter {
    let segment = before_default(segment, &["="]);
    let tokens: Vec<Token> = strip_decorations(segment, grammar);
    if tokens.is_empty() {
        return Parameter::new("", "");
    }

    // Function pointer: the name sits inside the first parenthesised group.
    if let Some(open) = tokens.iter().position(|t| t.is_punct("(")) {
        if let Some(close) = matching_close(&tokens, open, "(", ")") {
            if let Some(name_at) = tokens[open..close].iter().rposition(|t| t.kind == TokenKind::Identifier) {
                let name_at = open + name_at;
                let mut type_name = join(&tokens[..name_at]);
                type_name.push_str(&join(&tokens[name_at + 1..]));
                return Parameter::new(tokens[name_at].text, type_name);
            }
        }
    }

    // Trailing array brackets belong to the type: `char *argv[]`.
    let mut end = tokens.len();
    while end > 0 && tokens[end - 1].is_punct("]") {
        match tokens[..end].iter().rposition(|t| t.is_punct("[")) {
            Some(open) => end = open,
            None => break,
        }
    }
    let name_token = tokens[..end].last();
    match name_token {
        Some(name) if name.kind == TokenKind::Identifier && end >= 2 => {
            let mut type_name = join(&tokens[..end - 1]);
            type_name.push_str(&join(&tokens[end..]));
            Parameter::new(name.text, type_name)
        }
        _ => Parameter::new("", join(&tokens)),
    }
}

/// Drop modifiers, `@Annotations` and `[Attributes]` from a C-family segment.
fn strip_decorations<'a>(segment: &[Token<'a>], grammar: &Grammar) -> Vec<Token<'a>> {
    let modifiers = &grammar.functions.modifiers;
    let mut out = Vec::with_capacity(segment.len());
    let mut i = 0;
    while i < segment.len() {
        let token = segment[i];
        if token.is_punct("@") {
            i += 1;
            while i < segment.len() && (segment[i].is_word() || segment[i].is_punct(".")) {
                i += 1;
            }
            if i < segment.len() && segment[i].is_punct("(") {
                i = matching_close(segment, i, "(", ")").map(|c| c + 1).unwrap_or(segment.len());
            }
            continue;
        }
        if out.is_empty() && token.is_punct("[") {
            i = matching_close(segment, i, "[", "]").map(|c| c + 1).unwrap_or(segment.len());
            continue;
        }
        if token.is_word() && grammar.word_in(token.text, modifiers) {
            i += 1;
            continue;
        }
        out.push(token);
        i += 1;
    }
    out
}

/// Python parameter: `x`, `x: int`, `x: int = 3`, `*args`; bare `*` and `/`
/// markers are skipped.
fn name_colon_type(segment: &[Token]) -> Option<Parameter> {
    let segment = before_default(segment, &["="]);
    if segment.is_empty() || segment.iter().all(|t| t.is_punct("*") || t.is_punct("/")) {
        return None;
    }
    let colon = segment.iter().position(|t| t.is_punct(":"));
    Some(match colon {
        Some(c) => Parameter::new(join(&segment[..c]), join(&segment[c + 1..])),
        None => Parameter::new(join(segment), ""),
    })
}

/// VB parameter: `ByVal name As Type = default`.
fn name_as_type(segment: &[Token], grammar: &Grammar) -> Parameter {
    let segment = before_default(segment, &["="]);
    let tokens: Vec<Token> = segment
        .iter()
        .filter(|t| !(t.is_word() && grammar.word_in(t.text, &grammar.functions.modifiers)))
        .copied()
        .collect();
    let keyword = grammar.functions.type_keyword.as_deref().unwrap_or("As");
    match tokens.iter().position(|t| t.is_word() && grammar.word_eq(t.text, keyword)) {
        Some(at) => Parameter::new(join(&tokens[..at]), join(&tokens[at + 1..])),
        None => Parameter::new(join(&tokens), ""),
    }
}

/// Go results after the parameter list ending at `close`.
///
/// Returns the result types and the index just past them.
pub(crate) fn trailing_results(tokens: &[Token], close: usize) -> (Vec<String>, usize) {
    let start = close + 1;
    let Some(first) = tokens.get(start) else {
        return (Vec::new(), start);
    };
    let line = tokens[close].span.end_line;
    if first.span.line != line || first.is_punct("{") || first.is_punct(";") {
        return (Vec::new(), start);
    }

    if first.is_punct("(") {
        return match matching_close(tokens, start, "(", ")") {
            Some(end) => {
                let segments = split_top_level(&tokens[start + 1..end], false);
                let types = name_then_type(&segments)
                    .into_iter()
                    .map(|p| p.type_name)
                    .collect();
                (types, end + 1)
            }
            None => (Vec::new(), start),
        };
    }

    // Single result type: runs to the body brace or end of line.
    let mut j = start;
    let mut depth = 0i32;
    while let Some(token) = tokens.get(j) {
        if token.span.line != line {
            break;
        }
        if token.kind == TokenKind::Punctuation {
            match token.text {
                "{" if depth == 0 => {
                    let literal_type = j > start && matches!(tokens[j - 1].text, "interface" | "struct");
                    if !literal_type {
                        break;
                    }
                    match matching_close(tokens, j, "{", "}") {
                        Some(end) => {
                            j = end + 1;
                            continue;
                        }
                        None => break,
                    }
                }
                "(" | "[" => depth += 1,
                ")" | "]" => depth -= 1,
                ";" | "=" if depth == 0 => break,
                _ => {}
            }
        }
        j += 1;
    }
    if j == start {
        return (Vec::new(), start);
    }
    (vec![join(&tokens[start..j])], j)
}

/// Type tokens after a marker (`->` or `As`) up to `stop` at depth zero or
/// end of line.
pub(crate) fn annotated_result(tokens: &[Token], start: usize, stop: &[&str]) -> (Option<String>, usize) {
    let Some(first) = tokens.get(start) else {
        return (None, start);
    };
    let line = first.span.line;
    let mut j = start;
    let mut depth = 0i32;
    while let Some(token) = tokens.get(j) {
        if token.span.line != line && depth <= 0 {
            break;
        }
        if token.kind == TokenKind::Punctuation {
            match token.text {
                t if depth <= 0 && stop.contains(&t) => break,
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth -= 1,
                _ => {}
            }
        }
        j += 1;
    }
    if j == start {
        return (None, start);
    }
    (Some(join(&tokens[start..j])), j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{languages, tokenize};

    fn params_of(list: &str, grammar: &Grammar) -> Vec<(String, String)> {
        let stream = tokenize(list.as_bytes(), grammar).unwrap();
        parse_params(&stream.code_tokens(), grammar)
            .into_iter()
            .map(|p| (p.name, p.type_name))
            .collect()
    }

    fn pair(name: &str, type_name: &str) -> (String, String) {
        (name.to_string(), type_name.to_string())
    }

    #[test]
    fn test_go_grouped_names() {
        let go = languages::go::grammar();
        assert_eq!(params_of("a, b int", &go), vec![pair("a", "int"), pair("b", "int")]);
        assert_eq!(
            params_of("rpcName string, fptr interface{}", &go),
            vec![pair("rpcName", "string"), pair("fptr", "interface{}")]
        );
        assert_eq!(params_of("args ...string", &go), vec![pair("args", "...string")]);
    }

    #[test]
    fn test_go_unnamed() {
        let go = languages::go::grammar();
        assert_eq!(
            params_of("int, *pkg.Config, []byte", &go),
            vec![pair("", "int"), pair("", "*pkg.Config"), pair("", "[]byte")]
        );
    }

    #[test]
    fn test_c_family() {
        let c = languages::c::grammar();
        assert_eq!(params_of("void", &c), vec![]);
        assert_eq!(
            params_of("const char *fmt, char *argv[]", &c),
            vec![pair("fmt", "const char *"), pair("argv", "char *[]")]
        );
        assert_eq!(params_of("int (*cmp)(int, int)", &c), vec![pair("cmp", "int (*)(int, int)")]);
        assert_eq!(params_of("int, char", &c), vec![pair("", "int"), pair("", "char")]);

        let java = languages::java::grammar();
        assert_eq!(
            params_of("final String[] args, @Nullable Map<String, Integer> m", &java),
            vec![pair("args", "String[]"), pair("m", "Map<String, Integer>")]
        );
    }

    #[test]
    fn test_python_annotations_and_defaults() {
        let py = languages::python::grammar();
        assert_eq!(
            params_of("self, L, fN: int = 3, *args, **kw", &py),
            vec![
                pair("self", ""),
                pair("L", ""),
                pair("fN", "int"),
                pair("*args", ""),
                pair("**kw", "")
            ]
        );
        assert_eq!(params_of("a, *, b", &py), vec![pair("a", ""), pair("b", "")]);
    }

    #[test]
    fn test_name_only_drops_defaults() {
        let ruby = languages::ruby::grammar();
        assert_eq!(
            params_of("klass, options={}", &ruby),
            vec![pair("klass", ""), pair("options", "")]
        );
    }

    #[test]
    fn test_vb_as_clause() {
        let vb = languages::vb::grammar();
        assert_eq!(
            params_of("ByVal name As String, Optional count As Integer = 1", &vb),
            vec![pair("name", "String"), pair("count", "Integer")]
        );
    }

    #[test]
    fn test_go_trailing_results() {
        let go = languages::go::grammar();
        let cases = [
            ("func f() {", vec![]),
            ("func f() int {", vec!["int"]),
            ("func f() (err error) {", vec!["error"]),
            ("func f() (int, error) {", vec!["int", "error"]),
            ("func f() interface{ Error() string } {", vec!["interface{ Error() string }"]),
            ("func f() func() error {", vec!["func() error"]),
            ("func f() (\n\tint,\n\terror,\n) {", vec!["int", "error"]),
        ];
        for (src, expected) in cases {
            let stream = tokenize(src.as_bytes(), &go).unwrap();
            let tokens = stream.code_tokens();
            let close = tokens.iter().position(|t| t.is_punct(")")).unwrap();
            let (results, _) = trailing_results(&tokens, close);
            assert_eq!(results, expected, "source: {}", src);
        }
    }
}

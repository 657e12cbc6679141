//! Enclosing type scopes.
//!
//! A single pass over the code tokens records, for every token, the name of
//! the type whose body directly contains it. Braces-delimited grammars use a
//! frame stack driven by `{`/`}`; indentation-delimited grammars close a
//! scope when a line starts at or left of the line that opened it.

use crate::analysis::facts::TypeDeclaration;
use crate::analysis::tokens::{follows_member_access, is_line_first};
use crate::parser::grammar::{BlockStyle, Grammar};
use crate::parser::{Token, TokenKind, TokenStream};

/// Named type declarations (`class`, `struct`, `type X struct`) that open a
/// body, in source order.
pub fn extract_types(stream: &TokenStream, grammar: &Grammar) -> Vec<TypeDeclaration> {
    let tokens = stream.code_tokens();
    let scopes = ScopeMap::build(&tokens, grammar);
    scopes
        .declared
        .iter()
        .map(|&n| {
            let entry = &scopes.names[n];
            let keyword = &tokens[entry.keyword];
            let name = &tokens[entry.keyword + 1];
            // `type Point struct` is a struct.
            let kind = tokens
                .get(entry.keyword + 2)
                .filter(|t| t.is_word() && grammar.word_in(t.text, &grammar.functions.type_keywords))
                .unwrap_or(keyword);
            TypeDeclaration {
                name: entry.name.clone(),
                kind: kind.text.to_string(),
                owner: scopes.owner_at(entry.keyword).map(str::to_string),
                span: keyword.span.to(&name.span),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Body of a named type; index into `ScopeMap::names`.
    Type(usize),
    /// Any other block: function body, namespace, object literal.
    Block,
}

#[derive(Debug, Clone, Copy)]
struct IndentFrame {
    frame: Frame,
    column: usize,
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    /// Index of the type keyword among the code tokens.
    keyword: usize,
}

/// Owner type for each code token.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeMap {
    names: Vec<TypeEntry>,
    owners: Vec<Option<usize>>,
    /// Entries whose body was actually opened.
    declared: Vec<usize>,
}

impl ScopeMap {
    pub(crate) fn build(tokens: &[Token], grammar: &Grammar) -> Self {
        let mut map = ScopeMap {
            names: Vec::new(),
            owners: Vec::with_capacity(tokens.len()),
            declared: Vec::new(),
        };
        if grammar.functions.type_keywords.is_empty() {
            map.owners.resize(tokens.len(), None);
            return map;
        }
        match grammar.functions.block {
            BlockStyle::Braces => map.build_braces(tokens, grammar),
            BlockStyle::Indentation => map.build_indented(tokens, grammar),
        }
        map
    }

    /// Type whose body directly contains token `i`.
    pub(crate) fn owner_at(&self, i: usize) -> Option<&str> {
        self.owners
            .get(i)
            .copied()
            .flatten()
            .map(|n| self.names[n].name.as_str())
    }

    fn intern(&mut self, name: &str, keyword: usize) -> usize {
        self.names.push(TypeEntry {
            name: name.to_string(),
            keyword,
        });
        self.names.len() - 1
    }

    /// A type keyword at `i` followed by its name.
    fn type_name_at<'a>(tokens: &[Token<'a>], i: usize, grammar: &Grammar) -> Option<&'a str> {
        let token = &tokens[i];
        if !token.is_word() || !grammar.word_in(token.text, &grammar.functions.type_keywords) {
            return None;
        }
        if follows_member_access(tokens, i) {
            return None;
        }
        if i > 0 && grammar.word_in(tokens[i - 1].text, &grammar.functions.excluded_predecessors) {
            return None;
        }
        let name = tokens.get(i + 1)?;
        (name.kind == TokenKind::Identifier).then_some(name.text)
    }

    fn build_braces(&mut self, tokens: &[Token], grammar: &Grammar) {
        let mut stack: Vec<Frame> = Vec::new();
        let mut pending: Option<usize> = None;

        for (i, token) in tokens.iter().enumerate() {
            let owner = match stack.last() {
                Some(Frame::Type(n)) => Some(*n),
                _ => None,
            };
            self.owners.push(owner);

            if let Some(name) = Self::type_name_at(tokens, i, grammar) {
                pending = Some(self.intern(name, i));
                continue;
            }
            if token.kind != TokenKind::Punctuation {
                continue;
            }
            match token.text {
                "{" => stack.push(match pending.take() {
                    Some(n) => {
                        self.declared.push(n);
                        Frame::Type(n)
                    }
                    None => Frame::Block,
                }),
                "}" => {
                    stack.pop();
                }
                "(" | ")" | ";" | "=" => pending = None,
                _ => {}
            }
        }
    }

    fn build_indented(&mut self, tokens: &[Token], grammar: &Grammar) {
        let mut stack: Vec<IndentFrame> = Vec::new();
        let mut depth: i32 = 0;
        let mut line_column = 1;

        for (i, token) in tokens.iter().enumerate() {
            if is_line_first(tokens, i) {
                line_column = token.span.column;
                if depth <= 0 {
                    depth = 0;
                    while stack.last().map(|f| f.column >= line_column).unwrap_or(false) {
                        stack.pop();
                    }
                }
            }
            let owner = match stack.last() {
                Some(IndentFrame {
                    frame: Frame::Type(n),
                    ..
                }) => Some(*n),
                _ => None,
            };
            self.owners.push(owner);

            if let Some(name) = Self::type_name_at(tokens, i, grammar) {
                let n = self.intern(name, i);
                self.declared.push(n);
                stack.push(IndentFrame {
                    frame: Frame::Type(n),
                    column: line_column,
                });
                continue;
            }
            if token.is_word()
                && grammar.word_in(token.text, &grammar.functions.keywords)
                && !follows_member_access(tokens, i)
                && !(i > 0 && grammar.word_in(tokens[i - 1].text, &grammar.functions.excluded_predecessors))
            {
                stack.push(IndentFrame {
                    frame: Frame::Block,
                    column: line_column,
                });
                continue;
            }
            if token.kind == TokenKind::Punctuation {
                match token.text {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth -= 1,
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{languages, tokenize};

    /// Owner seen by the token right before the first `word` (its keyword).
    fn owner_of(src: &str, grammar: &Grammar, word: &str) -> Option<String> {
        let stream = tokenize(src.as_bytes(), grammar).unwrap();
        let tokens = stream.code_tokens();
        let map = ScopeMap::build(&tokens, grammar);
        let idx = tokens.iter().position(|t| t.text == word).unwrap();
        map.owner_at(idx - 1).map(str::to_string)
    }

    #[test]
    fn test_braces_nested_types() {
        let grammar = languages::java::grammar();
        let src = "class Outer {\n  void a() { int x; }\n  static class Inner {\n    void b() {}\n  }\n  void c() {}\n}\nvoid d() {}";
        assert_eq!(owner_of(src, &grammar, "a"), Some("Outer".to_string()));
        assert_eq!(owner_of(src, &grammar, "x"), None);
        assert_eq!(owner_of(src, &grammar, "b"), Some("Inner".to_string()));
        assert_eq!(owner_of(src, &grammar, "c"), Some("Outer".to_string()));
        assert_eq!(owner_of(src, &grammar, "d"), None);
    }

    #[test]
    fn test_braces_member_class_literal_is_not_scope() {
        let grammar = languages::java::grammar();
        let src = "class A {\n Object t = Foo.class;\n void m() {}\n}";
        assert_eq!(owner_of(src, &grammar, "m"), Some("A".to_string()));
    }

    #[test]
    fn test_indentation_python() {
        let grammar = languages::python::grammar();
        let src = "class Sim(object):\n    def run(self):\n        def inner():\n            pass\n    def stop(self):\n        pass\ndef free():\n    pass\n";
        assert_eq!(owner_of(src, &grammar, "run"), Some("Sim".to_string()));
        assert_eq!(owner_of(src, &grammar, "inner"), None);
        assert_eq!(owner_of(src, &grammar, "stop"), Some("Sim".to_string()));
        assert_eq!(owner_of(src, &grammar, "free"), None);
    }

    fn declared(src: &str, grammar: &Grammar) -> Vec<(String, String, Option<String>)> {
        let stream = tokenize(src.as_bytes(), grammar).unwrap();
        extract_types(&stream, grammar)
            .into_iter()
            .map(|t| (t.name, t.kind, t.owner))
            .collect()
    }

    fn decl(name: &str, kind: &str, owner: Option<&str>) -> (String, String, Option<String>) {
        (name.to_string(), kind.to_string(), owner.map(str::to_string))
    }

    #[test]
    fn test_types_need_a_body() {
        let grammar = languages::c::grammar();
        let src = "struct node { int v; };
struct node *make(void) { return 0; }
enum color { RED, GREEN };
struct fwd;
";
        assert_eq!(
            declared(src, &grammar),
            vec![decl("node", "struct", None), decl("color", "enum", None)]
        );
    }

    #[test]
    fn test_types_nested_and_go_kinds() {
        let java = languages::java::grammar();
        let src = "class Outer {
  enum Mode { A, B }
  static class Inner {}
}
";
        assert_eq!(
            declared(src, &java),
            vec![
                decl("Outer", "class", None),
                decl("Mode", "enum", Some("Outer")),
                decl("Inner", "class", Some("Outer")),
            ]
        );

        let go = languages::go::grammar();
        let src = "type Client struct {
	sync.Mutex
}
type Stringer interface {
	String() string
}
type ID int
";
        assert_eq!(
            declared(src, &go),
            vec![decl("Client", "struct", None), decl("Stringer", "interface", None)]
        );
    }

    #[test]
    fn test_types_indented() {
        let grammar = languages::python::grammar();
        let src = "class Sim(object):
    class Config:
        pass
";
        assert_eq!(
            declared(src, &grammar),
            vec![decl("Sim", "class", None), decl("Config", "class", Some("Sim"))]
        );
    }

    #[test]
    fn test_indentation_vb_end_class() {
        let grammar = languages::vb::grammar();
        let src = "Public Class Greeter\n    Sub Hello()\n    End Sub\nEnd Class\nModule Program\n    Sub Main()\n    End Sub\nEnd Module\n";
        assert_eq!(owner_of(src, &grammar, "Hello"), Some("Greeter".to_string()));
        assert_eq!(owner_of(src, &grammar, "Main"), Some("Program".to_string()));
    }
}

//! Built-in grammars.
//!
//! Each language module provides a single `grammar()` constructor returning
//! a plain [`Grammar`] value; no language has code of its own.

use crate::parser::grammar::Grammar;

pub mod bash;
pub mod c;
pub mod cpp;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod r;
pub mod ruby;
pub mod vb;

/// Every built-in grammar.
///
/// Extensions are claimed first-come, so C is listed before C++ and keeps
/// `.h`.
pub fn all() -> Vec<Grammar> {
    vec![
        go::grammar(),
        c::grammar(),
        cpp::grammar(),
        java::grammar(),
        csharp::grammar(),
        javascript::grammar(),
        python::grammar(),
        ruby::grammar(),
        r::grammar(),
        bash::grammar(),
        vb::grammar(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_grammars_validate() {
        for grammar in all() {
            assert!(grammar.validate().is_ok(), "{} failed validation", grammar.language);
        }
    }

    #[test]
    fn test_grammars_round_trip_through_yaml() {
        let python = python::grammar();
        let yaml = serde_yaml::to_string(&python).unwrap();
        let back: Grammar = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, python);
    }
}

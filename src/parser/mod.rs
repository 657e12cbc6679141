//! Grammar registry and lexical front end.
//!
//! This module provides:
//! - `Grammar`: data-only per-language descriptors (see [`grammar`])
//! - `tokenize`: the grammar-driven lexer (see [`lexer`])
//! - `GrammarRegistry`: lookup by language tag, alias or file extension
//! - Built-in grammars for the supported languages (see [`languages`])

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::trace;

pub mod grammar;
pub mod languages;
pub mod lexer;

pub use grammar::{Grammar, GrammarError};
pub use lexer::{tokenize, Token, TokenKind, TokenStream};

/// Built-in registry, created on first use and shared afterwards.
static BUILTIN: Lazy<GrammarRegistry> = Lazy::new(GrammarRegistry::builtin);

/// The registry holding every built-in grammar.
pub fn builtin_registry() -> &'static GrammarRegistry {
    &BUILTIN
}

/// Grammars keyed by canonical language tag.
///
/// Built once, then only read; lookups never mutate, so a registry can be
/// shared across threads by reference.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: HashMap<String, Arc<Grammar>>,
    aliases: HashMap<String, String>,
    extensions: HashMap<String, String>,
}

impl GrammarRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all built-in grammars.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for grammar in languages::all() {
            // Built-in grammars are distinct and valid.
            if let Err(err) = registry.register(grammar) {
                tracing::error!("built-in grammar rejected: {}", err);
            }
        }
        registry
    }

    /// Validate and add a grammar. Fails if its tag or an alias is taken.
    pub fn register(&mut self, grammar: Grammar) -> Result<(), GrammarError> {
        grammar.validate()?;
        let tag = grammar.language.to_lowercase();
        if self.resolve(&tag).is_some() {
            return Err(GrammarError::Duplicate(tag));
        }
        for alias in &grammar.aliases {
            let alias = alias.to_lowercase();
            if alias == tag || self.resolve(&alias).is_some() {
                return Err(GrammarError::Duplicate(alias));
            }
        }
        self.insert(tag, grammar);
        Ok(())
    }

    /// Add a grammar, replacing any grammar registered under the same tag.
    pub fn replace(&mut self, grammar: Grammar) -> Result<(), GrammarError> {
        grammar.validate()?;
        let tag = grammar.language.to_lowercase();
        self.remove(&tag);
        for alias in &grammar.aliases {
            let alias = alias.to_lowercase();
            if let Some(owner) = self.aliases.get(&alias) {
                return Err(GrammarError::Duplicate(format!("{} (alias of {})", alias, owner)));
            }
            if self.grammars.contains_key(&alias) {
                return Err(GrammarError::Duplicate(alias));
            }
        }
        self.insert(tag, grammar);
        Ok(())
    }

    fn insert(&mut self, tag: String, grammar: Grammar) {
        for alias in &grammar.aliases {
            self.aliases.insert(alias.to_lowercase(), tag.clone());
        }
        for ext in &grammar.extensions {
            self.extensions
                .entry(normalize_extension(ext))
                .or_insert_with(|| tag.clone());
        }
        self.grammars.insert(tag, Arc::new(grammar));
    }

    fn remove(&mut self, tag: &str) {
        if self.grammars.remove(tag).is_some() {
            self.aliases.retain(|_, owner| owner != tag);
            self.extensions.retain(|_, owner| owner != tag);
        }
    }

    /// Canonical tag for a tag or alias.
    fn resolve(&self, tag: &str) -> Option<&str> {
        let key = tag.to_lowercase();
        if let Some((canonical, _)) = self.grammars.get_key_value(&key) {
            return Some(canonical.as_str());
        }
        self.aliases.get(&key).map(String::as_str)
    }

    /// Grammar for a language tag or alias.
    pub fn get(&self, tag: &str) -> Option<Arc<Grammar>> {
        let found = self.resolve(tag).and_then(|t| self.grammars.get(t)).cloned();
        trace!(tag, found = found.is_some(), "grammar lookup");
        found
    }

    /// Canonical language tag for a file extension (with or without the dot).
    pub fn language_for_extension(&self, ext: &str) -> Option<&str> {
        self.extensions
            .get(&normalize_extension(ext))
            .map(String::as_str)
    }

    /// Map an extension to a registered language, overriding any default.
    pub fn set_extension(&mut self, ext: &str, tag: &str) -> Result<(), GrammarError> {
        let canonical = self
            .resolve(tag)
            .map(str::to_string)
            .ok_or_else(|| GrammarError::UnknownLanguage(tag.to_string()))?;
        self.extensions.insert(normalize_extension(ext), canonical);
        Ok(())
    }

    /// Registered canonical tags, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Registered grammars, sorted by tag.
    pub fn grammars(&self) -> Vec<Arc<Grammar>> {
        self.languages()
            .into_iter()
            .filter_map(|t| self.grammars.get(t).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

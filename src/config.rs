//! `langscan.yaml` configuration.
//!
//! A config can exclude paths from a scan, remap file extensions to
//! language tags, and add or replace grammars. Every field is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::parser::{Grammar, GrammarRegistry};

/// File names searched for in the working directory, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["langscan.yaml", ".langscan.yaml"];

/// Scanner configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for paths to skip (e.g. `**/vendor/**`).
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Extension to language tag overrides, e.g. `h: cpp`.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
    /// Extra grammars, or replacements for built-in ones with the same tag.
    #[serde(default)]
    pub grammars: Vec<Grammar>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse a config from YAML text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        // An empty file is a valid, empty config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Find a config file: `dir` first, then the user config directory.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .or_else(|| {
                let dirs = ProjectDirs::from("", "", "langscan")?;
                let path = dirs.config_dir().join(DEFAULT_CONFIG_NAMES[0]);
                path.is_file().then_some(path)
            })
    }

    /// Check patterns compile and that every grammar and override is
    /// accepted by a registry.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.exclusions()?;
        self.build_registry()?;
        Ok(())
    }

    /// Compiled `excluded_paths`.
    pub fn exclusions(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    /// The built-in grammars plus configured grammars and extension
    /// overrides.
    ///
    /// A configured grammar whose tag is already registered replaces it.
    pub fn build_registry(&self) -> anyhow::Result<GrammarRegistry> {
        let mut registry = GrammarRegistry::builtin();
        for grammar in &self.grammars {
            let tag = grammar.language.clone();
            let result = if registry.get(&tag).is_some() {
                registry.replace(grammar.clone())
            } else {
                registry.register(grammar.clone())
            };
            result.with_context(|| format!("grammar '{}' rejected", tag))?;
        }
        for (ext, tag) in &self.extensions {
            registry
                .set_extension(ext, tag)
                .with_context(|| format!("extension override '{}'", ext))?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::languages;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1"
excluded_paths:
  - "**/vendor/**"
  - "**/*_generated.go"
extensions:
  h: cpp
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.excluded_paths.len(), 2);
        assert_eq!(config.extensions.get("h").map(String::as_str), Some("cpp"));
        assert!(config.grammars.is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::parse("\n").unwrap();
        assert!(config.excluded_paths.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_path_exclusion() {
        let config = Config {
            excluded_paths: vec!["**/vendor/**".to_string(), "*.min.js".to_string()],
            ..Default::default()
        };
        let exclusions = config.exclusions().unwrap();
        assert!(exclusions.is_match(Path::new("src/vendor/lib/a.go")));
        assert!(exclusions.is_match(Path::new("app.min.js")));
        assert!(!exclusions.is_match(Path::new("src/main.go")));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let config = Config {
            excluded_paths: vec!["[unclosed".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.exclusions().is_err());
    }

    #[test]
    fn test_extension_override() {
        let config = Config::parse("extensions:\n  h: cpp\n  tpl: golang_missing\n").unwrap();
        let err = config.build_registry().unwrap_err();
        assert!(format!("{:#}", err).contains("golang_missing"));

        let config = Config::parse("extensions:\n  h: cpp\n").unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.language_for_extension("h"), Some("cpp"));
        assert_eq!(registry.language_for_extension("c"), Some("c"));
    }

    #[test]
    fn test_configured_grammar_added_and_replaced() {
        let mut extra = languages::python::grammar();
        extra.language = "starlark".to_string();
        extra.aliases = vec!["bzl".to_string()];
        extra.extensions = vec!["star".to_string(), "bzl".to_string()];

        let mut go = languages::go::grammar();
        go.extensions = vec!["go".to_string(), "gotmpl".to_string()];

        let config = Config {
            grammars: vec![extra, go],
            ..Default::default()
        };
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.language_for_extension("star"), Some("starlark"));
        assert_eq!(registry.language_for_extension("gotmpl"), Some("go"));
        assert!(registry.get("bzl").is_some());
    }

    #[test]
    fn test_grammar_from_yaml() {
        let grammar = serde_yaml::to_string(&languages::bash::grammar()).unwrap();
        let mut value: serde_yaml::Value = serde_yaml::from_str(&grammar).unwrap();
        value["language"] = "zsh".into();
        value["aliases"] = serde_yaml::Value::Sequence(Vec::new());
        value["extensions"] = serde_yaml::Value::Sequence(vec!["zsh".into()]);
        let mut root = serde_yaml::Mapping::new();
        root.insert("grammars".into(), serde_yaml::Value::Sequence(vec![value]));
        let yaml = serde_yaml::to_string(&root).unwrap();

        let config = Config::parse(&yaml).unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.language_for_extension("zsh"), Some("zsh"));
    }

    #[test]
    fn test_discover_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".langscan.yaml"), "version: \"1\"\n").unwrap();
        assert_eq!(
            Config::discover(dir.path()),
            Some(dir.path().join(".langscan.yaml"))
        );

        std::fs::write(dir.path().join("langscan.yaml"), "version: \"2\"\n").unwrap();
        let found = Config::discover(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("langscan.yaml"));
        assert_eq!(Config::parse_file(&found).unwrap().version, "2");
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::parse_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}

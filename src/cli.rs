//! Command-line interface for langscan.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::{analyze_batch, Analyzer, SourceFile};
use crate::config::{Config, DEFAULT_CONFIG_NAMES};
use crate::parser::GrammarRegistry;
use crate::report::{self, ScanResult};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor"];

/// Extract imported modules and function signatures from source files.
///
/// Languages are described by grammars; the built-in set covers Go, Java,
/// C, C++, C#, JavaScript, Python, Ruby, R, shell and Visual Basic, and
/// more can be added in langscan.yaml.
#[derive(Parser)]
#[command(name = "langscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan files and directories
    Scan(ScanArgs),
    /// List registered languages
    Languages(LanguagesArgs),
    /// Write a starter langscan.yaml
    Init(InitArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: Format,

    /// Treat every file as this language instead of using its extension
    #[arg(short, long)]
    pub language: Option<String>,

    /// Exit non-zero when any file has diagnostics
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the languages command.
#[derive(Parser)]
pub struct LanguagesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "langscan.yaml")]
    pub output: PathBuf,
}

const CONFIG_TEMPLATE: &str = include_str!("templates/langscan.yaml");

/// Load the explicit config, or a discovered one, or the defaults.
///
/// Returns the config and the path it came from.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(Path::new(".")),
    };
    match path {
        Some(p) => {
            debug!(config = %p.display(), "loading config");
            let config = Config::parse_file(&p)?;
            config.validate()?;
            Ok((config, Some(p)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// A file picked for scanning, with its language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub language: String,
}

/// Collect files under `root` whose language is known.
///
/// A file passed directly is always kept when `forced` is set; otherwise
/// its extension must map to a registered language.
pub fn collect_files(
    root: &Path,
    config: &Config,
    registry: &GrammarRegistry,
    forced: Option<&str>,
) -> anyhow::Result<Vec<Candidate>> {
    let exclusions = config.exclusions()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !(name.starts_with('.') || SKIPPED_DIRS.iter().any(|d| name == *d))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclusions.is_match(path) || exclusions.is_match(relative) {
            debug!(path = %path.display(), "excluded");
            continue;
        }

        let language = match forced {
            Some(tag) => Some(tag.to_string()),
            None => path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(|ext| registry.language_for_extension(ext))
                .map(str::to_string),
        };
        if let Some(language) = language {
            files.push(Candidate {
                path: path.to_path_buf(),
                language,
            });
        }
    }

    Ok(files)
}

/// Read candidates into memory. Unreadable files are skipped with a warning.
fn read_files(candidates: &[Candidate]) -> Vec<SourceFile> {
    candidates
        .iter()
        .filter_map(|c| match std::fs::read(&c.path) {
            Ok(content) => Some(SourceFile::new(
                c.path.to_string_lossy().to_string(),
                c.language.clone(),
                content,
            )),
            Err(e) => {
                warn!(path = %c.path.display(), "cannot read file: {}", e);
                None
            }
        })
        .collect()
}

/// Run the scan command. `verbose` adds line numbers to pretty output.
pub fn run_scan(args: &ScanArgs, verbose: bool) -> anyhow::Result<i32> {
    let (config, config_path) = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let registry = config.build_registry()?;

    if let Some(tag) = &args.language {
        if registry.get(tag).is_none() {
            eprintln!("Error: unknown language {:?}", tag);
            eprintln!("Run 'langscan languages' to see registered languages");
            return Ok(EXIT_ERROR);
        }
    }

    let mut candidates = Vec::new();
    for path in &args.paths {
        if !path.exists() {
            eprintln!("Error: cannot access path {:?}", path);
            return Ok(EXIT_ERROR);
        }
        candidates.extend(collect_files(path, &config, &registry, args.language.as_deref())?);
    }

    if candidates.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let files = read_files(&candidates);
    let analyzer = Analyzer::new(&registry);
    let results = analyze_batch(&analyzer, &files);
    let scan = ScanResult::from_batch(&files, results);

    let paths: Vec<String> = args
        .paths
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect();
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());

    match args.format {
        Format::Json => report::write_json(&paths, config_str.as_deref(), &scan)?,
        Format::Pretty => report::write_pretty(&paths, config_str.as_deref(), &scan, verbose),
    }

    Ok(exit_code(&scan, args.strict))
}

/// Exit code for a finished scan.
pub fn exit_code(scan: &ScanResult, strict: bool) -> i32 {
    if scan.has_failures() || (strict && scan.has_diagnostics()) {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the languages command.
pub fn run_languages(args: &LanguagesArgs) -> anyhow::Result<i32> {
    let (config, _) = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let registry = config.build_registry()?;

    println!("Registered languages:");
    println!();
    for grammar in registry.grammars() {
        let aliases = if grammar.aliases.is_empty() {
            String::new()
        } else {
            format!("({})", grammar.aliases.join(", "))
        };
        let extensions: Vec<String> = grammar.extensions.iter().map(|e| format!(".{}", e)).collect();
        println!("  {:<12} {:<24} {}", grammar.language, aliases, extensions.join(" "));
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    if !DEFAULT_CONFIG_NAMES.iter().any(|n| args.output.ends_with(n)) {
        println!("  2. Run: langscan scan . --config {}", args.output.display());
    } else {
        println!("  2. Run: langscan scan .");
    }

    Ok(EXIT_SUCCESS)
}

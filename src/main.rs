use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;
use xml_sync::config::{load_or_default, EngineConfig};
use xml_sync::specs::{ResourceKind, SpecRegistry};
use xml_sync::{PositionedDiagnostic, Severity, SourceDocument};

#[derive(Parser)]
#[command(name = "xml-sync")]
#[command(about = "Read, lint and surgically patch structured XML resources", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the nearest xml-sync.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the byte span and text a path resolves to
    Resolve {
        file: PathBuf,
        /// Path such as /aggregators/aggregator[0]/@class
        path: String,
    },

    /// Wrap over-long start tags one attribute per line
    Format {
        file: PathBuf,

        /// Write the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Override the configured line length budget
        #[arg(long)]
        max_line_length: Option<usize>,
    },

    /// Report problems in resource files (directories are searched for .xml)
    Lint {
        paths: Vec<PathBuf>,

        /// Resource kind; detected from the root element when omitted
        #[arg(short, long)]
        kind: Option<ResourceKind>,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the typed value of a resource file as JSON
    Read {
        file: PathBuf,

        #[arg(short, long)]
        kind: Option<ResourceKind>,
    },

    /// Read a resource and write it straight back; fails if the text changes
    Roundtrip {
        file: PathBuf,

        #[arg(short, long)]
        kind: Option<ResourceKind>,
    },

    /// List the table names table references resolve against
    Tables,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let start = env_start_dir(&cli.command);
    let config = load_or_default(cli.config.as_deref(), &start)?;

    match cli.command {
        Commands::Resolve { file, path } => cmd_resolve(&file, &path),
        Commands::Format {
            file,
            write,
            diff,
            max_line_length,
        } => cmd_format(&config, &file, write, diff, max_line_length),
        Commands::Lint { paths, kind, json } => cmd_lint(&config, &paths, kind, json),
        Commands::Read { file, kind } => cmd_read(&config, &file, kind),
        Commands::Roundtrip { file, kind } => cmd_roundtrip(&config, &file, kind),
        Commands::Tables => cmd_tables(&config),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "xml_sync=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Directory config discovery starts from: the input's directory, or the
/// current directory.
fn env_start_dir(command: &Commands) -> PathBuf {
    let input = match command {
        Commands::Resolve { file, .. }
        | Commands::Format { file, .. }
        | Commands::Read { file, .. }
        | Commands::Roundtrip { file, .. } => Some(file.as_path()),
        Commands::Lint { paths, .. } => paths.first().map(PathBuf::as_path),
        Commands::Tables => None,
    };
    let dir = input.and_then(|path| {
        if path.is_dir() {
            Some(path.to_path_buf())
        } else {
            path.parent().map(Path::to_path_buf)
        }
    });
    match dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => PathBuf::from("."),
    }
}

fn read_document(file: &Path) -> Result<SourceDocument> {
    let text =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    Ok(SourceDocument::parse(text))
}

fn kind_for(document: &SourceDocument, kind: Option<ResourceKind>, file: &Path) -> Result<ResourceKind> {
    if let Some(kind) = kind {
        return Ok(kind);
    }
    ResourceKind::detect(&document.root().tag_name).with_context(|| {
        format!(
            "cannot tell the resource kind of {} from <{}>; pass --kind",
            file.display(),
            document.root().tag_name
        )
    })
}

/// Atomic write: tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (modified)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

fn cmd_resolve(file: &Path, path: &str) -> Result<()> {
    let document = read_document(file)?;
    let path: xml_sync::Path = path.parse()?;

    match document.position_of(&path) {
        Some(position) => {
            let (line, column) = xml_sync::document::line_column(document.text(), position.from);
            println!(
                "{} {}..{} ({}:{})",
                path.to_string().bold(),
                position.from,
                position.to,
                line,
                column
            );
            println!("{}", position.slice(document.text()));
            Ok(())
        }
        None => {
            let fallback = xml_sync::position::resolve_best_effort(document.text(), &path);
            eprintln!(
                "{} {} did not resolve; nearest enclosing span is {}..{}",
                "✗".red(),
                path,
                fallback.from,
                fallback.to
            );
            std::process::exit(1);
        }
    }
}

fn cmd_format(
    config: &EngineConfig,
    file: &Path,
    write: bool,
    show_diff: bool,
    max_line_length: Option<usize>,
) -> Result<()> {
    let document = read_document(file)?;
    let mut options = config.format.clone();
    if let Some(max_line_length) = max_line_length {
        options.max_line_length = max_line_length;
    }

    let formatted = document.format(&options);
    let changed = formatted.text() != document.text();

    if show_diff && changed {
        display_diff(file, document.text(), formatted.text());
    }

    if write {
        if changed {
            atomic_write(file, formatted.text())?;
            println!("{} Formatted {}", "✓".green(), file.display());
        } else {
            println!("{} {} already formatted", "⊙".yellow(), file.display());
        }
    } else if !show_diff {
        print!("{}", formatted.text());
    }
    Ok(())
}

fn collect_xml_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("xml")
            {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn cmd_lint(
    config: &EngineConfig,
    paths: &[PathBuf],
    kind: Option<ResourceKind>,
    json: bool,
) -> Result<()> {
    let files = collect_xml_files(paths)?;
    if files.is_empty() {
        anyhow::bail!("no files to lint");
    }
    let registry = SpecRegistry::new(config.table_registry());

    let mut report = Vec::new();
    let mut errors = 0;
    let mut warnings = 0;

    for file in &files {
        let document = read_document(file)?;
        let diagnostics = match kind_for(&document, kind, file) {
            Ok(kind) => registry.lint(kind, &document),
            Err(_) if document.parse_error().is_some() => document.parse_diagnostics(),
            Err(error) => {
                eprintln!("{} {}", "⊘".cyan(), error);
                continue;
            }
        };

        for diagnostic in &diagnostics {
            match diagnostic.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
            }
        }
        if json {
            report.push(serde_json::json!({
                "file": file.display().to_string(),
                "diagnostics": diagnostics,
            }));
        } else {
            print_diagnostics(file, &diagnostics);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{}", "Summary:".bold());
        println!("  {} files", files.len());
        println!("  {} errors", format!("{}", errors).red());
        println!("  {} warnings", format!("{}", warnings).yellow());
    }

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_diagnostics(file: &Path, diagnostics: &[PositionedDiagnostic]) {
    if diagnostics.is_empty() {
        println!("{} {}", "✓".green(), file.display());
        return;
    }
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!(
            "{}:{}:{}: {}: {} {}",
            file.display(),
            diagnostic.line,
            diagnostic.column,
            severity,
            diagnostic.message,
            format!("[{}]", diagnostic.path).dimmed()
        );
    }
}

fn cmd_read(config: &EngineConfig, file: &Path, kind: Option<ResourceKind>) -> Result<()> {
    let document = read_document(file)?;
    let kind = kind_for(&document, kind, file)?;
    let registry = SpecRegistry::new(config.table_registry());

    let result = registry.read_json(kind, &document)?;
    let output = serde_json::json!({
        "kind": kind,
        "value": result.value,
        "diagnostics": document.positioned(&result.diagnostics),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_roundtrip(config: &EngineConfig, file: &Path, kind: Option<ResourceKind>) -> Result<()> {
    let document = read_document(file)?;
    let kind = kind_for(&document, kind, file)?;
    let registry = SpecRegistry::new(config.table_registry());

    let written = registry.roundtrip(kind, &document)?;
    if written == document.text() {
        println!("{} {}: unchanged after round trip", "✓".green(), file.display());
        Ok(())
    } else {
        eprintln!("{} {}: round trip changed the text", "✗".red(), file.display());
        display_diff(file, document.text(), &written);
        std::process::exit(1);
    }
}

fn cmd_tables(config: &EngineConfig) -> Result<()> {
    let tables = config.table_registry();
    println!("{}", format!("Class prefix: {}", tables.class_prefix()).dimmed());
    for name in tables.names() {
        println!("  {}", name);
    }
    Ok(())
}

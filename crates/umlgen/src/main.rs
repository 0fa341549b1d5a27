use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use umlgen_core::config::{Config, UnknownTypePolicy};
use umlgen_core::pipeline::{Analysis, AnalysisPipeline};
use umlgen_core::source::SourceCollector;

use umlgen_java::JavaFrontend;
use umlgen_report::{diagram, dot, json, text};

#[derive(Parser)]
#[command(name = "umlgen")]
#[command(about = "Generate UML class diagrams from source code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Glsp,
    Mermaid,
    Dot,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source tree and print its class diagram
    Analyze {
        /// Path to the project root
        path: PathBuf,
        /// Output format (defaults to [output] format in the config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Config file path (defaults to .umlgen.toml in the project or an ancestor)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fail classes that reference types which cannot be resolved
        #[arg(long)]
        strict: bool,
        /// How to treat unknown types: foreign or external
        #[arg(long)]
        unknown_types: Option<String>,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Create a default .umlgen.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

struct AnalyzeArgs {
    path: PathBuf,
    format: Option<OutputFormat>,
    config: Option<PathBuf>,
    strict: bool,
    unknown_types: Option<String>,
    compact: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            path,
            format,
            config,
            strict,
            unknown_types,
            compact,
        } => cmd_analyze(AnalyzeArgs {
            path,
            format,
            config,
            strict,
            unknown_types,
            compact,
        }),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

/// Diagnostics go to stderr, filtered by `UMLGEN_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("UMLGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = load_config(&args.path, args.config.as_deref())?;
    if args.strict {
        config.resolver.fail_on_unresolved_type = true;
    }
    if let Some(policy) = &args.unknown_types {
        config.resolver.unknown_types = policy.parse::<UnknownTypePolicy>()?;
    }
    let format = match args.format {
        Some(format) => format,
        None => OutputFormat::from_str(&config.output.format, true)
            .map_err(|e| anyhow::anyhow!("invalid output format in config: {e}"))?,
    };

    let analysis = run_analysis(&args.path, &config)?;
    let include_members = config.output.include_members;
    let output = match format {
        OutputFormat::Text => text::format_report(&analysis),
        OutputFormat::Json => json::format_model(&analysis, args.compact)
            .context("failed to serialize model")?
            + "\n",
        OutputFormat::Glsp => {
            json::format_glsp(&analysis.model, include_members, args.compact)
                .context("failed to serialize diagram")?
                + "\n"
        }
        OutputFormat::Mermaid => diagram::generate_class_diagram(&analysis.model, include_members),
        OutputFormat::Dot => dot::generate_class_diagram(&analysis.model, include_members),
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    if !analysis.failures.is_empty() {
        for failure in &analysis.failures {
            eprintln!("error: {failure}");
        }
        process::exit(1);
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(".umlgen.toml");
    if target.exists() && !force {
        anyhow::bail!(".umlgen.toml already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())?;
    println!("Created .umlgen.toml with default configuration.");
    Ok(())
}

fn load_config(project_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => Ok(Config::load_or_default(project_path)),
    }
}

fn run_analysis(project_path: &Path, config: &Config) -> Result<Analysis> {
    if !project_path.is_dir() {
        anyhow::bail!("'{}' is not a directory", project_path.display());
    }
    let frontend = JavaFrontend::new().context("failed to initialize Java front-end")?;
    let decls = SourceCollector::new(&config.project.exclude_patterns).collect(project_path, &frontend);
    tracing::info!(declarations = decls.len(), "sources collected");

    AnalysisPipeline::new(config)
        .analyze(decls)
        .context("analysis failed")
}

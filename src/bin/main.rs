//! intentql CLI - Compile query intents to SQL
//!
//! Usage:
//!   intentql compile --intent <intent.json> [--catalog <file> | --sample <name>]
//!   intentql validate --intent <intent.json> [--catalog <file> | --sample <name>]
//!   intentql catalog [--catalog <file> | --sample <name>]
//!
//! Examples:
//!   intentql compile --intent revenue.json --sample multi-schema
//!   intentql compile --intent revenue.json --catalog catalog.toml --output json
//!   echo '{"metric":"revenue"}' | intentql compile --intent - --reference-date 2024-05-15
//!   intentql catalog --sample snowflake

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use intentql::catalog::loader::{self, LoadError};
use intentql::catalog::samples::SampleCatalog;
use intentql::catalog::SemanticCatalog;
use intentql::compile::{CompileError, SqlCompiler};
use intentql::config::{CatalogSource, Settings, SettingsError};
use intentql::intent::QueryIntent;
use intentql::logging;
use intentql::validation::SemanticValidator;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "intentql")]
#[command(about = "intentql - Compile structured query intents to deterministic SQL")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $INTENTQL_CONFIG, ./intentql.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and compile an intent to SQL
    Compile {
        #[command(flatten)]
        intent: IntentArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Resolve relative time ranges against this date instead of today
        #[arg(long, value_name = "YYYY-MM-DD")]
        reference_date: Option<NaiveDate>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Check an intent against the catalog without generating SQL
    Validate {
        #[command(flatten)]
        intent: IntentArgs,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// List the catalog's entities, metrics and dimensions as JSON
    Catalog {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

#[derive(Args)]
struct IntentArgs {
    /// Path to the intent JSON file ("-" reads stdin)
    #[arg(short, long)]
    intent: PathBuf,
}

#[derive(Args)]
#[group(multiple = false)]
struct CatalogArgs {
    /// Catalog definition file (.toml or .json)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Built-in sample catalog
    #[arg(short, long)]
    sample: Option<SampleArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SampleArg {
    Simple,
    MultiSchema,
    Snowflake,
}

impl From<SampleArg> for SampleCatalog {
    fn from(arg: SampleArg) -> Self {
        match arg {
            SampleArg::Simple => SampleCatalog::Simple,
            SampleArg::MultiSchema => SampleCatalog::MultiSchema,
            SampleArg::Snowflake => SampleCatalog::Snowflake,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with a comment header
    Verbose,
    /// Output SQL and metadata as JSON
    Json,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to build sample catalog: {0}")]
    Sample(#[from] intentql::catalog::CatalogError),

    #[error("Failed to read intent '{path}': {source}")]
    ReadIntent {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid intent JSON: {0}")]
    IntentJson(#[source] serde_json::Error),

    #[error("Failed to serialize output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("Compilation error: {0}")]
    Compile(#[from] CompileError),

    #[error("Intent is invalid ({0} issue(s))")]
    Invalid(usize),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        settings.logging.level.as_str()
    };
    logging::init(level);

    let result = match cli.command {
        Commands::Compile {
            intent,
            catalog,
            reference_date,
            output,
        } => cmd_compile(&settings, intent, catalog, reference_date, output),
        Commands::Validate { intent, catalog } => cmd_validate(&settings, intent, catalog),
        Commands::Catalog { catalog } => cmd_catalog(&settings, catalog),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let CliError::Compile(CompileError::Validation(issues)) = &e {
                for issue in issues {
                    eprintln!("  - {}", issue);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

/// Command-line flags win over the settings file; the multi-schema sample is the fallback.
fn load_catalog(settings: &Settings, args: CatalogArgs) -> Result<SemanticCatalog, CliError> {
    let source = match (args.catalog, args.sample) {
        (Some(path), _) => CatalogSource::File(path),
        (None, Some(sample)) => CatalogSource::Sample(sample.into()),
        (None, None) => settings
            .catalog
            .source()?
            .unwrap_or(CatalogSource::Sample(SampleCatalog::MultiSchema)),
    };

    let catalog = match &source {
        CatalogSource::File(path) => {
            info!(path = %path.display(), "loading catalog");
            loader::load_catalog(path)?
        }
        CatalogSource::Sample(sample) => {
            info!(sample = %sample, "using sample catalog");
            sample.build()?
        }
    };
    Ok(catalog)
}

fn read_intent(args: &IntentArgs) -> Result<QueryIntent, CliError> {
    let display = args.intent.display().to_string();
    let read_error = |source: io::Error| CliError::ReadIntent {
        path: display.clone(),
        source,
    };

    let json = if display == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(read_error)?;
        buf
    } else {
        fs::read_to_string(&args.intent).map_err(read_error)?
    };

    QueryIntent::from_json(&json).map_err(CliError::IntentJson)
}

fn cmd_compile(
    settings: &Settings,
    intent: IntentArgs,
    catalog: CatalogArgs,
    reference_date: Option<NaiveDate>,
    output: OutputFormat,
) -> Result<(), CliError> {
    let query = read_intent(&intent)?;
    let catalog = load_catalog(settings, catalog)?;

    let mut options = settings.compiler.clone();
    if let Some(date) = reference_date {
        options = options.with_reference_date(date);
    }

    let compiled = SqlCompiler::new(&catalog)
        .with_options(options)
        .compile_checked(&query)?;

    match output {
        OutputFormat::Sql => {
            println!("{}", compiled.sql);
        }
        OutputFormat::Verbose => {
            println!("-- intentql compiled SQL");
            println!("-- Intent: {}", intent.intent.display());
            println!("-- Metric: {}", query.metric);
            println!("-- Dialect: {}", compiled.metadata.dialect);
            println!("-- Joins: {}", compiled.metadata.joins_count);
            println!("-- Fingerprint: {}", compiled.metadata.fingerprint);
            println!();
            println!("{}", compiled.sql);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&compiled).map_err(CliError::Output)?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn cmd_validate(
    settings: &Settings,
    intent: IntentArgs,
    catalog: CatalogArgs,
) -> Result<(), CliError> {
    let query = read_intent(&intent)?;
    let catalog = load_catalog(settings, catalog)?;

    let issues = SemanticValidator::new(&catalog)
        .with_max_limit(settings.compiler.max_limit)
        .validate(&query);

    if issues.is_empty() {
        println!("OK: {} is valid", intent.intent.display());
        return Ok(());
    }

    eprintln!("Validation errors:");
    for issue in &issues {
        eprintln!("  {}", issue);
    }
    Err(CliError::Invalid(issues.len()))
}

fn cmd_catalog(settings: &Settings, catalog: CatalogArgs) -> Result<(), CliError> {
    let catalog = load_catalog(settings, catalog)?;
    let json = serde_json::to_string_pretty(&catalog.summary()).map_err(CliError::Output)?;
    println!("{}", json);
    Ok(())
}

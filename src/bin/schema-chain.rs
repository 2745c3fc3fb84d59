//! Schema Chain CLI
//!
//! Command-line interface for resolving type catalogs into schema registries.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use schema_chain::{
    check_references, load_catalog_auto, Case, CollisionPolicy, ModelConverters,
    NamingTransformer, Severity, TypeCatalog, TypeHandle,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-chain")]
#[command(about = "Resolve type catalogs into named JSON schemas")]
#[command(version)]
struct Cli {
    /// Log converter activity to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a root type and print every schema it references
    Read {
        /// Catalog source: file path or URL (http:// or https://)
        catalog: String,

        /// Root type to resolve (e.g., Order, Order[])
        #[arg(long)]
        root: TypeHandle,

        /// Naming convention applied to schema names and property keys
        #[arg(long, value_enum, default_value_t = Naming::None)]
        naming: Naming,

        /// Only print schemas defined by the root type itself
        #[arg(long)]
        root_only: bool,

        /// What to do when two types resolve to the same schema name
        #[arg(long, value_enum, default_value_t = OnCollision::Fail)]
        on_collision: OnCollision,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Resolve a root type and report reference problems in the result
    Check {
        /// Catalog source: file path or URL (http:// or https://)
        catalog: String,

        /// Root type to resolve
        #[arg(long)]
        root: TypeHandle,

        /// Naming convention applied to schema names and property keys
        #[arg(long, value_enum, default_value_t = Naming::None)]
        naming: Naming,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Naming {
    None,
    Snake,
    Kebab,
}

impl Naming {
    fn case(self) -> Option<Case> {
        match self {
            Naming::None => None,
            Naming::Snake => Some(Case::Snake),
            Naming::Kebab => Some(Case::Kebab),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnCollision {
    Fail,
    Overwrite,
}

impl From<OnCollision> for CollisionPolicy {
    fn from(value: OnCollision) -> Self {
        match value {
            OnCollision::Fail => CollisionPolicy::Fail,
            OnCollision::Overwrite => CollisionPolicy::Overwrite,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Read {
            catalog,
            root,
            naming,
            root_only,
            on_collision,
            output,
            pretty,
        } => run_read(ReadArgs {
            catalog,
            root,
            naming,
            root_only,
            on_collision,
            output,
            pretty,
        }),

        Commands::Check {
            catalog,
            root,
            naming,
            format,
            strict,
        } => run_check(&catalog, &root, naming, &format, strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "schema_chain=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &str) -> Result<TypeCatalog, u8> {
    load_catalog_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn build_converters(catalog: TypeCatalog, naming: Naming, policy: CollisionPolicy) -> ModelConverters {
    let mut converters = ModelConverters::new(catalog).with_collision_policy(policy);
    if let Some(case) = naming.case() {
        converters.add_converter(Box::new(NamingTransformer::new(case)));
    }
    converters
}

struct ReadArgs {
    catalog: String,
    root: TypeHandle,
    naming: Naming,
    root_only: bool,
    on_collision: OnCollision,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_read(args: ReadArgs) -> Result<(), u8> {
    let ReadArgs {
        catalog,
        root,
        naming,
        root_only,
        on_collision,
        output,
        pretty,
    } = args;

    let converters = build_converters(load(&catalog)?, naming, on_collision.into());

    let models = if root_only {
        converters.read(&root)
    } else {
        converters.read_all(&root)
    }
    .map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if models.is_empty() {
        eprintln!("Warning: no schemas defined for {}", root);
    }

    let json_output = if pretty {
        serde_json::to_string_pretty(&models)
    } else {
        serde_json::to_string(&models)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_check(
    catalog: &str,
    root: &TypeHandle,
    naming: Naming,
    format: &str,
    strict: bool,
) -> Result<(), u8> {
    let converters = build_converters(load(catalog)?, naming, CollisionPolicy::Fail);
    let models = converters.read_all_unchecked(root).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let report = check_references(&models);
    let passed = report.is_ok() && (!strict || report.warnings == 0);

    if format == "json" {
        let json_output = serde_json::to_string_pretty(&report).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", json_output);
    } else {
        for diag in &report.diagnostics {
            let (color, label) = match diag.severity {
                Severity::Error => ("\x1b[31m", "error"),
                Severity::Warning => ("\x1b[33m", "warning"),
            };
            println!(
                "  {}{}[{}]\x1b[0m: {}{} - {}",
                color, label, diag.code, diag.schema, diag.path, diag.message
            );
        }

        if passed {
            println!(
                "\x1b[32m✓ {} schemas, {} references checked, all resolved\x1b[0m",
                report.schemas_checked, report.references_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} schemas, {} references checked ({} errors, {} warnings)\x1b[0m",
                report.schemas_checked, report.references_checked, report.errors, report.warnings
            );
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}

mod accessors;
mod generate;
mod node;

use clap::{Parser, Subcommand};
use ktdsl_core::logging::{LoggingOptions, init_logging};
use std::path::PathBuf;

pub use node::SnapshotProject;

#[derive(Parser)]
#[command(
    name = "ktdsl",
    version,
    about = "Generates Kotlin DSL extensions and typed project accessors",
    long_about = "ktdsl reads compiled host API classes to generate Kotlin extension functions \
                  that take lambdas with receivers in place of callback objects, and generates, \
                  compiles and caches typed accessors for the extensions of a project schema."
)]
pub struct Cli {
    /// Mirror log output on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Directory for log files (default: ~/.ktdsl/logs)
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate action extensions from compiled classes
    #[command(
        long_about = "Scans jars and class directories and writes one Kotlin extension per public \
                      method taking a callback as its last parameter. Settings are read from \
                      ktdsl.json in the current directory unless --config is given; flags override \
                      the file. Exits with an error if any extension could not be generated."
    )]
    GenerateExtensions(generate::GenerateArgs),
    /// Resolve, compile and cache the accessors of a project
    Accessors(accessors::ProjectArgs),
    /// Print the accessors source of a project
    AccessorsReport(accessors::ProjectArgs),
    /// Print the cache key and directory name of a project's accessors
    CacheKey(accessors::ProjectArgs),
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let options = LoggingOptions {
        to_stderr: cli.verbose,
        verbose: cli.verbose,
        dir: cli.log_dir.clone(),
    };
    let _guard = init_logging("cli", &options);

    match cli.command {
        Commands::GenerateExtensions(args) => generate::run(args),
        Commands::Accessors(args) => accessors::run_accessors(args),
        Commands::AccessorsReport(args) => accessors::run_report(args),
        Commands::CacheKey(args) => accessors::run_cache_key(args),
    }
}

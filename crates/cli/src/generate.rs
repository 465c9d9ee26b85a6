use clap::Args;
use ktdsl_api::models::{KDocIndex, KDocProvider};
use ktdsl_core::{ActionExtensionWriter, GeneratorConfig, SamRegistry, SweepReport};
use ktdsl_java::ClassPathScanner;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Args)]
pub struct GenerateArgs {
    /// Jars and class directories to scan
    #[arg(value_name = "CLASSPATH", required = true)]
    pub classpath: Vec<PathBuf>,
    /// Configuration file (default: ./ktdsl.json when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// JSON documentation index
    #[arg(long, value_name = "FILE")]
    pub docs: Option<PathBuf>,
    /// Generated Kotlin source file
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Package prefix to scan, may be repeated
    #[arg(long, value_name = "PREFIX")]
    pub include: Vec<String>,
    /// Package prefix to skip, may be repeated
    #[arg(long, value_name = "PREFIX")]
    pub exclude: Vec<String>,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Classes")]
    classes: usize,
    #[tabled(rename = "Generic (skipped)")]
    generic: usize,
    #[tabled(rename = "Unbound (skipped)")]
    unbound: usize,
    #[tabled(rename = "Extensions")]
    extensions: usize,
    #[tabled(rename = "Failures")]
    failures: usize,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn effective_config(args: GenerateArgs) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::discover(&std::env::current_dir()?)?,
    };
    if !args.include.is_empty() {
        config.include = args.include;
    }
    if !args.exclude.is_empty() {
        config.exclude = args.exclude;
    }
    if args.docs.is_some() {
        config.docs = args.docs;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    Ok(config)
}

pub fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let classpath = args.classpath.clone();
    let config = effective_config(args)?;

    info!(
        "Scanning {} classpath entries (include: {:?}, exclude: {:?})",
        classpath.len(),
        config.include,
        config.exclude
    );
    let classes = ClassPathScanner::new()
        .include(config.include.iter().cloned())
        .exclude(config.exclude.iter().cloned())
        .scan(&classpath)?;

    let docs = config
        .docs
        .as_deref()
        .map(KDocIndex::from_json_file)
        .transpose()?;
    if let Some(docs) = &docs {
        info!("Loaded documentation for {} methods", docs.len());
    }

    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let sink = BufWriter::new(File::create(&config.output)?);
    let mut writer = ActionExtensionWriter::new(sink, docs.as_ref().map(|d| d as &dyn KDocProvider))?
        .with_callbacks(SamRegistry::from_classes(&classes));
    let sweep = writer.write_classes(&classes)?;
    writer.into_inner().flush()?;

    print_report(&sweep);
    println!("Wrote {}", config.output.display());

    if sweep.failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} extensions could not be generated", sweep.failures.len()).into())
    }
}

fn print_report(sweep: &SweepReport) {
    let summary = SummaryRow {
        classes: sweep.classes,
        generic: sweep.generic_classes,
        unbound: sweep.unbound_methods,
        extensions: sweep.declarations,
        failures: sweep.failures.len(),
    };
    println!("{}", Table::new(vec![summary]));

    if !sweep.failures.is_empty() {
        let rows: Vec<FailureRow> = sweep
            .failures
            .iter()
            .map(|f| FailureRow {
                class: f.class.clone(),
                method: format!("{}({})", f.method, f.parameter_types.join(", ")),
                reason: f.message.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}

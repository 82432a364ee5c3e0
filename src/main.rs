use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zerf_tools::rules::RuleConfiguration;
use zerf_tools::workflow;
use zerf_tools::{Result, ToolError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&cli.log_level).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| ToolError::Logging(error.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Clean(args) => execute_clean(args),
        Command::Preview(args) => execute_preview(args),
        Command::Validate(args) => execute_validate(args),
        Command::Rules(args) => execute_rules(args),
    }
}

fn execute_clean(args: CleanArgs) -> Result<()> {
    let rules = load_rules(args.source.rules.as_deref())?;
    let output = args
        .output
        .unwrap_or_else(|| workflow::default_output_path(&args.source.input));

    let report = workflow::clean_workbook(
        &args.source.input,
        &output,
        &rules,
        args.source.sheet.as_deref(),
    )?;

    if let Some(report_path) = &args.report {
        workflow::write_report(report_path, &report)?;
    }
    println!("{report}");
    println!("cleaned workbook: {}", output.display());
    Ok(())
}

fn execute_preview(args: PreviewArgs) -> Result<()> {
    let rules = load_rules(args.source.rules.as_deref())?;
    let preview = workflow::preview_workbook(
        &args.source.input,
        &rules,
        args.source.sheet.as_deref(),
        args.samples,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    println!("{}", preview.report);
    for sample in &preview.samples {
        println!();
        println!("{} removed, e.g.:", sample.step);
        for record in &sample.records {
            println!("  {}", serde_json::to_string(record)?);
        }
    }
    Ok(())
}

fn execute_validate(args: SourceArgs) -> Result<()> {
    let rules = load_rules(args.rules.as_deref())?;
    let missing = workflow::inspect_workbook(&args.input, &rules, args.sheet.as_deref())?;
    for entry in &missing {
        println!("missing field '{}' required by {}", entry.field, entry.step);
    }

    match missing.into_iter().next() {
        Some(entry) => Err(ToolError::Schema {
            field: entry.field,
            step: entry.step,
        }),
        None => {
            println!(
                "{}: all fields required by enabled steps are present",
                args.input.display()
            );
            Ok(())
        }
    }
}

fn execute_rules(args: RulesArgs) -> Result<()> {
    let rendered = RuleConfiguration::default().to_toml_string()?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn load_rules(path: Option<&Path>) -> Result<RuleConfiguration> {
    match path {
        Some(path) => RuleConfiguration::load(path),
        None => Ok(RuleConfiguration::default()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clean ERF report extracts before they are uploaded."
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every cleaning step and write the cleaned workbook.
    Clean(CleanArgs),
    /// Show what a clean would remove without writing anything.
    Preview(PreviewArgs),
    /// Check that the workbook carries every field the enabled steps need.
    Validate(SourceArgs),
    /// Print the default rule configuration as TOML.
    Rules(RulesArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Exported report workbook.
    #[arg(long)]
    input: PathBuf,

    /// Rule configuration file; the standing business rules apply otherwise.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Worksheet to read. Defaults to the first one.
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(clap::Args)]
struct CleanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Cleaned workbook path. Defaults to `<input>_cleaned.xlsx`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the cleaning report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
struct PreviewArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Removed rows to show per step.
    #[arg(long, default_value_t = 5)]
    samples: usize,

    /// Print the preview as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct RulesArgs {
    /// Write the rules to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

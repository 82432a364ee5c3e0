use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::zerf::tools::error::{Result, ToolError};
use crate::zerf::tools::io::excel_read;
use crate::zerf::tools::io::excel_write;
use crate::zerf::tools::pipeline::{self, MissingField};
use crate::zerf::tools::report::{CleaningReport, Preview};
use crate::zerf::tools::rules::RuleConfiguration;

/// Cleans an exported workbook and writes the result to `output`. Nothing is
/// written when validation fails.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn clean_workbook(
    input: &Path,
    output: &Path,
    rules: &RuleConfiguration,
    sheet: Option<&str>,
) -> Result<CleaningReport> {
    ensure_exists(input)?;
    let sheet_data = excel_read::read_dataset(input, sheet)?;
    info!(
        sheet = %sheet_data.sheet_name,
        rows = sheet_data.dataset.len(),
        "read report extract"
    );

    let (cleaned, report) = pipeline::clean(sheet_data.dataset, rules)?;
    excel_write::write_dataset(output, &sheet_data.sheet_name, &cleaned)?;
    info!(
        rows = cleaned.len(),
        removed = report.total_removed(),
        "cleaned workbook written"
    );
    Ok(report)
}

/// Dry-runs the pipeline over an exported workbook. Writes nothing.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn preview_workbook(
    input: &Path,
    rules: &RuleConfiguration,
    sheet: Option<&str>,
    sample_limit: usize,
) -> Result<Preview> {
    ensure_exists(input)?;
    let sheet_data = excel_read::read_dataset(input, sheet)?;
    info!(rows = sheet_data.dataset.len(), "read report extract");
    pipeline::preview(&sheet_data.dataset, rules, sample_limit)
}

/// Checks rule parameters and lists the fields the workbook is missing.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn inspect_workbook(
    input: &Path,
    rules: &RuleConfiguration,
    sheet: Option<&str>,
) -> Result<Vec<MissingField>> {
    ensure_exists(input)?;
    rules.validate()?;
    let sheet_data = excel_read::read_dataset(input, sheet)?;
    Ok(pipeline::check_schema(&sheet_data.dataset, rules))
}

/// Persists a report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &CleaningReport) -> Result<()> {
    let json_string = serde_json::to_string_pretty(report)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// `<stem>_cleaned.xlsx` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    input.with_file_name(format!("{stem}_cleaned.xlsx"))
}

fn ensure_exists(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(ToolError::MissingInput(input.to_path_buf()));
    }
    Ok(())
}

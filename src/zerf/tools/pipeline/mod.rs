//! The seven-step cleaning engine.
//!
//! A run validates the rule parameters and the dataset schema, then feeds the
//! dataset through [`Step::ALL`] in order. Each step consumes the previous
//! step's dataset and hands on a new one, and every step appends exactly one
//! entry to the [`CleaningReport`], including disabled steps. The engine does
//! no IO and keeps no state between runs.

mod step;

pub use step::{Step, unique_key};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::zerf::tools::error::{Result, ToolError};
use crate::zerf::tools::model::{Dataset, Record};
use crate::zerf::tools::report::{CleaningReport, Preview, RemovalSample};
use crate::zerf::tools::rules::RuleConfiguration;

/// A field an enabled step needs but the dataset does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub field: String,
    pub step: Step,
}

/// Cleans `dataset` and returns the surviving rows with the run report.
pub fn clean(dataset: Dataset, rules: &RuleConfiguration) -> Result<(Dataset, CleaningReport)> {
    let run = execute(dataset, rules, 0)?;
    Ok((run.dataset, run.report))
}

/// Runs the same steps as [`clean`] without handing back a dataset. Up to
/// `sample_limit` removed records are kept per step for review.
pub fn preview(
    dataset: &Dataset,
    rules: &RuleConfiguration,
    sample_limit: usize,
) -> Result<Preview> {
    let run = execute(dataset.clone(), rules, sample_limit)?;
    Ok(Preview {
        report: run.report,
        samples: run.samples,
    })
}

/// Lists every field missing for every enabled step, in step order.
pub fn check_schema(dataset: &Dataset, rules: &RuleConfiguration) -> Vec<MissingField> {
    if is_blank_sheet(dataset) {
        return Vec::new();
    }

    let mut missing = Vec::new();
    for step in Step::ALL {
        if !step.is_enabled(rules) {
            continue;
        }
        for field in step.required_fields(rules) {
            if !dataset.has_column(field) {
                missing.push(MissingField {
                    field: field.to_string(),
                    step,
                });
            }
        }
    }
    missing
}

struct Run {
    dataset: Dataset,
    report: CleaningReport,
    samples: Vec<RemovalSample>,
}

#[instrument(level = "debug", skip_all, fields(rows = dataset.len()))]
fn execute(dataset: Dataset, rules: &RuleConfiguration, sample_limit: usize) -> Result<Run> {
    rules.validate()?;
    if let Some(missing) = check_schema(&dataset, rules).into_iter().next() {
        return Err(ToolError::Schema {
            field: missing.field,
            step: missing.step,
        });
    }
    debug!(columns = ?dataset.columns(), "schema validated");

    if dataset.is_empty() {
        warn!("dataset has no rows; every step will report zero removals");
    }

    let mut report = CleaningReport::new(dataset.len());
    let mut samples = Vec::new();
    let mut current = dataset;

    for step in Step::ALL {
        let input_count = current.len();
        let (next, removed): (Dataset, Vec<Record>) = step.apply(rules, current, sample_limit);
        report.record(step, input_count, next.len());

        if step.is_enabled(rules) {
            info!(
                step = step.name(),
                input = input_count,
                output = next.len(),
                removed = input_count - next.len(),
                "step applied"
            );
        } else {
            debug!(step = step.name(), "step disabled; rows passed through");
        }

        if !removed.is_empty() {
            samples.push(RemovalSample {
                step,
                records: removed,
            });
        }
        current = next;
    }

    debug_assert_eq!(
        report.total_removed() + current.len(),
        report.initial_count(),
        "every removed row is attributed to one step"
    );
    if report.is_emptied() {
        warn!(
            initial = report.initial_count(),
            "every row was removed; the cleaned dataset is empty"
        );
    }

    Ok(Run {
        dataset: current,
        report,
        samples,
    })
}

// A worksheet with neither header nor rows carries no schema to validate.
fn is_blank_sheet(dataset: &Dataset) -> bool {
    dataset.columns().is_empty() && dataset.is_empty()
}

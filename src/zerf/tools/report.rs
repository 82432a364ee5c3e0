use std::fmt;

use serde::{Deserialize, Serialize};

use crate::zerf::tools::model::Record;
use crate::zerf::tools::pipeline::Step;

/// Row counts for one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: Step,
    pub input_count: usize,
    pub output_count: usize,
    pub removed_count: usize,
}

/// Ordered per-step outcomes of one pipeline run.
///
/// Built by the pipeline only; once returned to the caller it is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    initial_count: usize,
    steps: Vec<StepOutcome>,
}

impl CleaningReport {
    pub(crate) fn new(initial_count: usize) -> Self {
        Self {
            initial_count,
            steps: Vec::with_capacity(Step::ALL.len()),
        }
    }

    pub(crate) fn record(&mut self, step: Step, input_count: usize, output_count: usize) {
        self.steps.push(StepOutcome {
            step,
            input_count,
            output_count,
            removed_count: input_count - output_count,
        });
    }

    /// Rows in the dataset handed to the pipeline.
    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    /// Rows left after the last step.
    pub fn final_count(&self) -> usize {
        self.steps
            .last()
            .map(|outcome| outcome.output_count)
            .unwrap_or(self.initial_count)
    }

    /// Rows removed across all steps.
    pub fn total_removed(&self) -> usize {
        self.steps.iter().map(|outcome| outcome.removed_count).sum()
    }

    /// Outcomes in execution order.
    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    /// Outcome of a single step.
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|outcome| outcome.step == step)
    }

    /// Rows removed by a single step.
    pub fn removed_by(&self, step: Step) -> usize {
        self.outcome(step)
            .map(|outcome| outcome.removed_count)
            .unwrap_or(0)
    }

    /// Returns `true` when rows went in but none survived.
    pub fn is_emptied(&self) -> bool {
        self.initial_count > 0 && self.final_count() == 0
    }

    /// Returns `true` when the pipeline was handed zero rows.
    pub fn is_empty_input(&self) -> bool {
        self.initial_count == 0
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<4}{:<28}{:>10}{:>10}{:>10}",
            "#", "step", "input", "output", "removed"
        )?;
        for outcome in &self.steps {
            writeln!(
                f,
                "{:<4}{:<28}{:>10}{:>10}{:>10}",
                outcome.step.position(),
                outcome.step.name(),
                outcome.input_count,
                outcome.output_count,
                outcome.removed_count
            )?;
        }
        write!(
            f,
            "{} rows in, {} rows out, {} removed",
            self.initial_count,
            self.final_count(),
            self.total_removed()
        )
    }
}

/// Records a step removed, kept for operator review in preview mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalSample {
    pub step: Step,
    pub records: Vec<Record>,
}

/// Result of a dry run: the report plus samples of removed rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub report: CleaningReport,
    pub samples: Vec<RemovalSample>,
}

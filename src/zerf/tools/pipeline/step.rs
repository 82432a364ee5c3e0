use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::zerf::tools::model::{Dataset, ERF_NUMBER, ITEM, Record};
use crate::zerf::tools::normalize::{normalize, normalize_text};
use crate::zerf::tools::rules::RuleConfiguration;

/// The cleaning steps, in the only order they ever run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Annotates every record with `ERF Number` + `Item`.
    KeyDerivation,
    /// Keeps the first record per unique key.
    DuplicateRemoval,
    /// Drops excluded schedule line statuses.
    StatusExclusion,
    /// Drops blank schedule line statuses.
    BlankStatusExclusion,
    /// Drops the excluded commodity type.
    CommodityExclusion,
    /// Keeps allow-listed plants only.
    PlantInclusion,
    /// Drops excluded purchasing groups.
    PurchasingGroupExclusion,
}

impl Step {
    /// Every step in execution order.
    pub const ALL: [Step; 7] = [
        Step::KeyDerivation,
        Step::DuplicateRemoval,
        Step::StatusExclusion,
        Step::BlankStatusExclusion,
        Step::CommodityExclusion,
        Step::PlantInclusion,
        Step::PurchasingGroupExclusion,
    ];

    /// One-based position in the pipeline.
    pub fn position(self) -> usize {
        Step::ALL
            .iter()
            .position(|step| *step == self)
            .map_or(0, |index| index + 1)
    }

    /// Stable snake_case name, matching the rule table name.
    pub fn name(self) -> &'static str {
        match self {
            Step::KeyDerivation => "key_derivation",
            Step::DuplicateRemoval => "duplicate_removal",
            Step::StatusExclusion => "status_exclusion",
            Step::BlankStatusExclusion => "blank_status_exclusion",
            Step::CommodityExclusion => "commodity_exclusion",
            Step::PlantInclusion => "plant_inclusion",
            Step::PurchasingGroupExclusion => "purchasing_group_exclusion",
        }
    }

    /// Whether the step is switched on in `rules`.
    pub fn is_enabled(self, rules: &RuleConfiguration) -> bool {
        match self {
            Step::KeyDerivation => rules.key_derivation.enabled,
            Step::DuplicateRemoval => rules.duplicate_removal.enabled,
            Step::StatusExclusion => rules.status_exclusion.enabled,
            Step::BlankStatusExclusion => rules.blank_status_exclusion.enabled,
            Step::CommodityExclusion => rules.commodity_exclusion.enabled,
            Step::PlantInclusion => rules.plant_inclusion.enabled,
            Step::PurchasingGroupExclusion => rules.purchasing_group_exclusion.enabled,
        }
    }

    /// Fields the step reads from every record.
    pub fn required_fields(self, rules: &RuleConfiguration) -> Vec<&str> {
        match self {
            Step::KeyDerivation | Step::DuplicateRemoval => vec![ERF_NUMBER, ITEM],
            Step::StatusExclusion => vec![rules.status_exclusion.column.as_str()],
            Step::BlankStatusExclusion => vec![rules.blank_status_exclusion.column.as_str()],
            Step::CommodityExclusion => vec![rules.commodity_exclusion.column.as_str()],
            Step::PlantInclusion => vec![rules.plant_inclusion.column.as_str()],
            Step::PurchasingGroupExclusion => {
                vec![rules.purchasing_group_exclusion.column.as_str()]
            }
        }
    }

    /// Runs the step over `dataset`. Returns the surviving dataset and up to
    /// `sample_limit` of the removed records.
    pub(crate) fn apply(
        self,
        rules: &RuleConfiguration,
        dataset: Dataset,
        sample_limit: usize,
    ) -> (Dataset, Vec<Record>) {
        if !self.is_enabled(rules) {
            return (dataset, Vec::new());
        }

        match self {
            Step::KeyDerivation => (derive_keys(dataset, &rules.key_derivation.column), Vec::new()),
            Step::DuplicateRemoval => {
                let mut seen = HashSet::new();
                retain(dataset, sample_limit, |record| seen.insert(unique_key(record)))
            }
            Step::StatusExclusion => {
                let rule = &rules.status_exclusion;
                let excluded = normalized_set(&rule.values);
                retain(dataset, sample_limit, |record| {
                    !excluded.contains(&field_value(record, &rule.column))
                })
            }
            Step::BlankStatusExclusion => {
                let column = &rules.blank_status_exclusion.column;
                retain(dataset, sample_limit, |record| !record.is_blank(column))
            }
            Step::CommodityExclusion => {
                let rule = &rules.commodity_exclusion;
                let excluded = normalize_text(&rule.value);
                retain(dataset, sample_limit, |record| {
                    field_value(record, &rule.column) != excluded
                })
            }
            Step::PlantInclusion => {
                let rule = &rules.plant_inclusion;
                let allowed = normalized_set(&rule.values);
                retain(dataset, sample_limit, |record| {
                    allowed.contains(&field_value(record, &rule.column))
                })
            }
            Step::PurchasingGroupExclusion => {
                let rule = &rules.purchasing_group_exclusion;
                let excluded = normalized_set(&rule.values);
                retain(dataset, sample_limit, |record| {
                    !excluded.contains(&field_value(record, &rule.column))
                })
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.position(), self.name())
    }
}

/// `ERF Number` and `Item` concatenated as they read, without a separator.
pub fn unique_key(record: &Record) -> String {
    let mut key = record.text(ERF_NUMBER);
    key.push_str(&record.text(ITEM));
    key
}

fn derive_keys(dataset: Dataset, column: &str) -> Dataset {
    let (mut columns, records) = dataset.into_parts();

    // An existing key column, in any letter case, is overwritten in place.
    let target = match columns
        .iter()
        .find(|existing| existing.to_lowercase() == column.to_lowercase())
    {
        Some(existing) => existing.clone(),
        None => {
            let position = columns
                .iter()
                .position(|existing| existing == ERF_NUMBER)
                .map_or(columns.len(), |index| index + 1);
            columns.insert(position, column.to_string());
            column.to_string()
        }
    };

    let records = records
        .into_iter()
        .map(|mut record| {
            let key = unique_key(&record);
            record.insert(target.as_str(), key);
            record
        })
        .collect();

    Dataset::from_records(columns, records)
}

fn retain<F>(dataset: Dataset, sample_limit: usize, mut keep: F) -> (Dataset, Vec<Record>)
where
    F: FnMut(&Record) -> bool,
{
    let (columns, records) = dataset.into_parts();
    let mut kept = Vec::with_capacity(records.len());
    let mut samples = Vec::new();

    for record in records {
        if keep(&record) {
            kept.push(record);
        } else if samples.len() < sample_limit {
            samples.push(record);
        }
    }

    (Dataset::from_records(columns, kept), samples)
}

fn field_value(record: &Record, column: &str) -> String {
    record.get(column).map(normalize).unwrap_or_default()
}

fn normalized_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|value| normalize_text(value)).collect()
}

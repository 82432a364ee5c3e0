use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::zerf::tools::error::{Result, ToolError};
use crate::zerf::tools::model::{
    COMMODITY_TYPE, ERF_NUMBER, ITEM, PURCHASING_GROUP, SCHED_LINE_STATUS, SHIP_TO_PLANT,
    UNIQUE_ID,
};
use crate::zerf::tools::normalize::normalize_text;

/// Parameters for every cleaning step. Passed explicitly into each pipeline
/// run; the defaults are the standing business rules for the ERF report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfiguration {
    pub key_derivation: KeyDerivationRule,
    pub duplicate_removal: DuplicateRemovalRule,
    pub status_exclusion: StatusExclusionRule,
    pub blank_status_exclusion: BlankStatusRule,
    pub commodity_exclusion: CommodityExclusionRule,
    pub plant_inclusion: PlantInclusionRule,
    pub purchasing_group_exclusion: PurchasingGroupRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyDerivationRule {
    pub enabled: bool,
    /// Column the unique key is written to.
    pub column: String,
}

impl Default for KeyDerivationRule {
    fn default() -> Self {
        Self {
            enabled: true,
            column: UNIQUE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicateRemovalRule {
    pub enabled: bool,
}

impl Default for DuplicateRemovalRule {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusExclusionRule {
    pub enabled: bool,
    pub column: String,
    #[serde(deserialize_with = "deserialize_values")]
    pub values: Vec<String>,
}

impl Default for StatusExclusionRule {
    fn default() -> Self {
        Self {
            enabled: true,
            column: SCHED_LINE_STATUS.to_string(),
            values: strings(&["Draft", "Presubmit", "Submit"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlankStatusRule {
    pub enabled: bool,
    pub column: String,
}

impl Default for BlankStatusRule {
    fn default() -> Self {
        Self {
            enabled: true,
            column: SCHED_LINE_STATUS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommodityExclusionRule {
    pub enabled: bool,
    pub column: String,
    #[serde(deserialize_with = "deserialize_value")]
    pub value: String,
}

impl Default for CommodityExclusionRule {
    fn default() -> Self {
        Self {
            enabled: true,
            column: COMMODITY_TYPE.to_string(),
            value: "Indirect".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantInclusionRule {
    pub enabled: bool,
    pub column: String,
    /// Allowed plant codes.
    #[serde(deserialize_with = "deserialize_values")]
    pub values: Vec<String>,
}

impl Default for PlantInclusionRule {
    fn default() -> Self {
        Self {
            enabled: true,
            column: SHIP_TO_PLANT.to_string(),
            values: strings(&["6100", "6200", "6300"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PurchasingGroupRule {
    pub enabled: bool,
    pub column: String,
    #[serde(deserialize_with = "deserialize_values")]
    pub values: Vec<String>,
}

impl Default for PurchasingGroupRule {
    fn default() -> Self {
        Self {
            enabled: true,
            column: PURCHASING_GROUP.to_string(),
            values: strings(&["W91", "Z05"]),
        }
    }
}

impl RuleConfiguration {
    /// Returns a configuration with every step switched off.
    pub fn disabled() -> Self {
        let mut rules = Self::default();
        rules.set_all_enabled(false);
        rules
    }

    /// Switches every step on or off, keeping the parameters.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.key_derivation.enabled = enabled;
        self.duplicate_removal.enabled = enabled;
        self.status_exclusion.enabled = enabled;
        self.blank_status_exclusion.enabled = enabled;
        self.commodity_exclusion.enabled = enabled;
        self.plant_inclusion.enabled = enabled;
        self.purchasing_group_exclusion.enabled = enabled;
    }

    /// Parses a TOML rule file. Omitted tables and keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Loads a TOML rule file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn enabled_filter_columns(&self) -> Vec<&str> {
        [
            (self.status_exclusion.enabled, &self.status_exclusion.column),
            (
                self.blank_status_exclusion.enabled,
                &self.blank_status_exclusion.column,
            ),
            (self.commodity_exclusion.enabled, &self.commodity_exclusion.column),
            (self.plant_inclusion.enabled, &self.plant_inclusion.column),
            (
                self.purchasing_group_exclusion.enabled,
                &self.purchasing_group_exclusion.column,
            ),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, column)| column.as_str())
        .collect()
    }

    /// Checks the parameter sets of enabled steps.
    pub fn validate(&self) -> Result<()> {
        if self.key_derivation.enabled {
            let column = self.key_derivation.column.trim();
            require_column("key_derivation", column)?;
            let mut read_fields = vec![ERF_NUMBER, ITEM];
            read_fields.extend(self.enabled_filter_columns());
            if let Some(field) = read_fields
                .into_iter()
                .find(|field| field.trim().to_lowercase() == column.to_lowercase())
            {
                return Err(ToolError::Configuration(format!(
                    "key_derivation.column must not overwrite the '{field}' field read by the rules"
                )));
            }
        }

        if self.status_exclusion.enabled {
            require_column("status_exclusion", &self.status_exclusion.column)?;
            require_non_blank_values("status_exclusion", &self.status_exclusion.values)?;
        }

        if self.blank_status_exclusion.enabled {
            require_column("blank_status_exclusion", &self.blank_status_exclusion.column)?;
        }

        if self.commodity_exclusion.enabled {
            require_column("commodity_exclusion", &self.commodity_exclusion.column)?;
            require_non_blank_values(
                "commodity_exclusion",
                std::slice::from_ref(&self.commodity_exclusion.value),
            )?;
        }

        if self.plant_inclusion.enabled {
            require_column("plant_inclusion", &self.plant_inclusion.column)?;
            if self.plant_inclusion.values.is_empty() {
                return Err(ToolError::Configuration(
                    "plant_inclusion.values is empty; every row would be removed".into(),
                ));
            }
            require_non_blank_values("plant_inclusion", &self.plant_inclusion.values)?;
        }

        if self.purchasing_group_exclusion.enabled {
            require_column(
                "purchasing_group_exclusion",
                &self.purchasing_group_exclusion.column,
            )?;
            require_non_blank_values(
                "purchasing_group_exclusion",
                &self.purchasing_group_exclusion.values,
            )?;
        }

        Ok(())
    }
}

fn require_column(rule: &str, column: &str) -> Result<()> {
    if column.trim().is_empty() {
        return Err(ToolError::Configuration(format!("{rule}.column is blank")));
    }
    Ok(())
}

// Blank rows are the business of the blank-status step alone.
fn require_non_blank_values(rule: &str, values: &[String]) -> Result<()> {
    if values.iter().any(|value| normalize_text(value).is_empty()) {
        return Err(ToolError::Configuration(format!(
            "{rule} contains a blank value"
        )));
    }
    Ok(())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Rule parameters may be written as text or as numbers, e.g. plant codes.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl From<ParameterValue> for String {
    fn from(value: ParameterValue) -> Self {
        match value {
            ParameterValue::Text(value) => value,
            ParameterValue::Integer(value) => value.to_string(),
            ParameterValue::Float(value) => value.to_string(),
            ParameterValue::Boolean(value) => value.to_string(),
        }
    }
}

fn deserialize_values<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<ParameterValue>::deserialize(deserializer)?;
    Ok(values.into_iter().map(String::from).collect())
}

fn deserialize_value<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    ParameterValue::deserialize(deserializer).map(String::from)
}

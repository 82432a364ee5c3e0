use std::path::PathBuf;

use thiserror::Error;

use crate::zerf::tools::pipeline::Step;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads a report extract, cleans it, or writes the cleaned workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a report cannot be serialised to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a rule file is not valid TOML or does not match the schema.
    #[error("rule file error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Raised when the rule configuration cannot be rendered as TOML.
    #[error("rule export error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised before any row is processed when an enabled step reads a field
    /// that the dataset does not carry.
    #[error("missing field '{field}' required by {step}")]
    Schema { field: String, step: Step },

    /// Raised when a rule parameter set is malformed.
    #[error("invalid rule configuration: {0}")]
    Configuration(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

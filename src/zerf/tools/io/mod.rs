//! Workbook adapters: read an exported report into a [`Dataset`] and write a
//! cleaned [`Dataset`] back out.
//!
//! [`Dataset`]: crate::zerf::tools::model::Dataset

pub mod excel_read;
pub mod excel_write;

//! Core library for the zerf-tools command line application.
//!
//! The library cleans ERF report extracts exported from the ERP system. The
//! modules keep responsibilities narrow: the tabular data model lives in
//! [`zerf::tools::model`], the rule parameters in [`zerf::tools::rules`], the
//! seven-step cleaning engine in [`zerf::tools::pipeline`], workbook adapters
//! under [`zerf::tools::io`], and file-level orchestration in
//! [`zerf::tools::workflow`].

pub mod zerf;

pub use zerf::tools::{
    Result, ToolError, error, io, model, normalize, pipeline, report, rules, workflow,
};

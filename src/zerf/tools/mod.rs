pub mod error;
pub mod io;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod workflow;

pub use error::{Result, ToolError};

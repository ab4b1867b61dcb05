use std::path::PathBuf;

use polars::prelude::DataFrame;
use serde::Serialize;

use holo_model::TimeWindow;

#[derive(Debug)]
pub struct SummaryResult {
    pub groups: Vec<String>,
    pub value_column: String,
    pub window: TimeWindow,
    pub data: DataFrame,
    /// Set when the result was written to disk instead of printed.
    pub output: Option<PathBuf>,
}

/// Shape of a recording table as reported by `describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameDescription {
    pub rows: usize,
    pub cells: usize,
    pub trials: usize,
    pub timepoints: usize,
    pub columns: Vec<String>,
}

//! Configuration options for augmentation and aggregation.

use serde::{Deserialize, Serialize};

use crate::schema::{CELL, JoinKey, ReplacePolicy, TRIAL, VALUE};
use crate::window::TimeWindow;

/// Options for attaching trial-wise or cell-wise annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachOptions {
    /// Column name for bare values and arrays. Ignored for named inputs.
    pub name: Option<String>,

    /// Conflict policy. `None` falls back to the join key's default.
    pub replace: Option<ReplacePolicy>,
}

impl AttachOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options naming the attached column.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            replace: None,
        }
    }

    pub fn with_replace(mut self, replace: impl Into<ReplacePolicy>) -> Self {
        self.replace = Some(replace.into());
        self
    }

    /// Resolve the effective policy for `key`.
    pub fn policy_for(&self, key: JoinKey) -> ReplacePolicy {
        self.replace.unwrap_or_else(|| key.default_policy())
    }
}

/// Layout of an aggregation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// One row per group-key combination.
    #[default]
    Stacked,
    /// Last grouping column spread across output columns.
    Pivoted,
}

/// Ownership contract of an aggregation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultMode {
    /// Independent frame the caller may mutate freely.
    #[default]
    Owned,
    /// Caller accepts a result that may share buffers; logs a warning.
    Shared,
}

/// Grouped temporal-mean request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Grouping columns, outermost first.
    pub group_columns: Vec<String>,
    /// Column averaged within each group.
    pub value_column: String,
    pub window: TimeWindow,
    pub shape: OutputShape,
    pub result: ResultMode,
}

impl AggregationSpec {
    /// Stacked whole-trace means of `value` grouped by `group_columns`.
    pub fn new<I, S>(group_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_columns: group_columns.into_iter().map(Into::into).collect(),
            value_column: VALUE.to_string(),
            window: TimeWindow::Whole,
            shape: OutputShape::Stacked,
            result: ResultMode::Owned,
        }
    }

    /// Groups by `cell`, then `conds`.
    pub fn by_cell<I, S>(conds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(std::iter::once(CELL.to_string()).chain(conds.into_iter().map(Into::into)))
    }

    /// Groups by `cell`, `trial`, then `conds`.
    pub fn by_trial<I, S>(conds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            [CELL.to_string(), TRIAL.to_string()]
                .into_iter()
                .chain(conds.into_iter().map(Into::into)),
        )
    }

    pub fn with_value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = column.into();
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_shape(mut self, shape: OutputShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn pivoted(self) -> Self {
        self.with_shape(OutputShape::Pivoted)
    }

    pub fn with_result_mode(mut self, result: ResultMode) -> Self {
        self.result = result;
        self
    }
}

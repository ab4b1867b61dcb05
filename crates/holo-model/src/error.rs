//! Error types for HoloFrame augmentation and aggregation.

use thiserror::Error;

use crate::schema::JoinKey;

/// Errors raised by HoloFrame operations.
///
/// Every error is returned before the target table is touched, so a failed
/// call never leaves a partially augmented frame behind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HoloError {
    /// Annotation input is not one of the recognised shapes.
    #[error(
        "unsupported annotation input ({kind}); pass values, a 1-D array, a mapping, a column or a table"
    )]
    UnsupportedType { kind: String },

    /// Array-like annotation has more than one dimension.
    #[error("annotation array must have exactly one dimension, got {ndim}")]
    Shape { ndim: usize },

    /// Mapping annotation whose sequences differ in length.
    #[error("mapping column '{column}' has {actual} values, expected {expected}")]
    RaggedMapping {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Bare values or arrays supplied without a column name.
    #[error("a column name is required for bare values and arrays")]
    MissingName,

    /// Annotation row count does not match the distinct key count.
    #[error("number of {key}s ({expected}) and length of {key}wise data ({actual}) must match")]
    Cardinality {
        key: JoinKey,
        expected: usize,
        actual: usize,
    },

    /// Annotation carries the same key value twice.
    #[error("annotation key '{key}' contains duplicate value {value}")]
    DuplicateKey { key: JoinKey, value: String },

    /// Merge would overwrite existing columns without `replace`.
    #[error(
        "column(s) already exist: {}; use replace to override",
        columns.join(", ")
    )]
    DuplicateColumn { columns: Vec<String> },

    /// Time window bound list has an unsupported length.
    #[error(
        "length of time window should be absent (whole trace), 2 (no baselining) or 4 (baselining), not {len}"
    )]
    InvalidWindow { len: usize },

    /// Table holds the same (cell, trial, time) triple twice.
    #[error("duplicate row for cell {cell}, trial {trial}, time {time}")]
    DuplicateRow {
        cell: String,
        trial: String,
        time: String,
    },

    /// A referenced column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Value column cannot be averaged.
    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// Aggregation requested without grouping columns.
    #[error("at least one grouping column is required")]
    EmptyGrouping,

    /// Pivoted output would repeat a column name.
    #[error("pivoted output has clashing column names: {}", names.join(", "))]
    PivotNameClash { names: Vec<String> },

    /// Sampling rate is zero, negative or not finite.
    #[error("frame rate must be a positive finite number, got {0}")]
    InvalidFrameRate(f64),

    /// Polars DataFrame operation error.
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Coarse error taxonomy, stable across variant additions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedType,
    Shape,
    MissingName,
    Cardinality,
    DuplicateColumn,
    InvalidWindow,
    Validation,
    DataFrame,
}

impl HoloError {
    /// Maps the error onto its taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::Shape { .. } | Self::RaggedMapping { .. } => ErrorKind::Shape,
            Self::MissingName => ErrorKind::MissingName,
            Self::Cardinality { .. } => ErrorKind::Cardinality,
            Self::DuplicateColumn { .. } => ErrorKind::DuplicateColumn,
            Self::InvalidWindow { .. } => ErrorKind::InvalidWindow,
            Self::DuplicateKey { .. }
            | Self::DuplicateRow { .. }
            | Self::ColumnNotFound(_)
            | Self::NonNumericColumn { .. }
            | Self::EmptyGrouping
            | Self::PivotNameClash { .. }
            | Self::InvalidFrameRate(_) => ErrorKind::Validation,
            Self::Polars(_) => ErrorKind::DataFrame,
        }
    }
}

/// Result type for HoloFrame operations.
pub type Result<T> = std::result::Result<T, HoloError>;

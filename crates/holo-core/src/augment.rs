//! Trial-wise and cell-wise annotation attach.

use polars::prelude::DataFrame;

use holo_model::{AttachOptions, HoloError, JoinKey, Result};

use crate::annotation::Annotation;
use crate::merge::merge_unit;
use crate::normalize::normalize;

/// Normalizes `input`, checks it holds one row per distinct `key` value, and
/// merges it onto `table`.
///
/// Validation runs before any merge, so on error `table` is unchanged and no
/// partial result exists.
pub fn attach(
    table: &DataFrame,
    input: Annotation,
    key: JoinKey,
    options: &AttachOptions,
) -> Result<DataFrame> {
    let unit = normalize(input, options.name.as_deref())?;
    let expected = distinct_count(table, key)?;
    if unit.height() != expected {
        return Err(HoloError::Cardinality {
            key,
            expected,
            actual: unit.height(),
        });
    }
    merge_unit(table, &unit, key, options.policy_for(key))
}

/// Number of distinct values in the key column.
pub fn distinct_count(table: &DataFrame, key: JoinKey) -> Result<usize> {
    let column = table
        .column(key.column())
        .map_err(|_| HoloError::ColumnNotFound(key.column().to_string()))?;
    Ok(column.as_materialized_series().n_unique()?)
}

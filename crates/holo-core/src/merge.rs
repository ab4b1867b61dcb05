//! Broadcast merge of annotation units onto a HoloFrame table.

use std::collections::HashMap;

use polars::prelude::{AnyValue, Column, DataFrame, IdxCa, IdxSize, IntoColumn, SortOptions};
use tracing::debug;

use holo_common::any_to_string;
use holo_model::{HoloError, IDENTITY_COLUMNS, JoinKey, ReplacePolicy, Result};

use crate::annotation::AnnotationUnit;

/// Left-joins `unit` onto `table` by `key`, broadcasting each unit row to every
/// table row sharing its key.
///
/// Attached columns are appended after the existing ones and table row order
/// is preserved. Rows whose key has no unit entry receive nulls. A unit column
/// that already exists in `table` is dropped first under
/// [`ReplacePolicy::Replace`] and rejected under [`ReplacePolicy::Reject`];
/// identity columns are never replaced.
pub fn merge_unit(
    table: &DataFrame,
    unit: &AnnotationUnit,
    key: JoinKey,
    policy: ReplacePolicy,
) -> Result<DataFrame> {
    let key_name = key.column();
    let table_keys = table
        .column(key_name)
        .map_err(|_| HoloError::ColumnNotFound(key_name.to_string()))?;
    let (unit_keys, values) = split_key_column(unit.data(), key)?;

    let value_names: Vec<String> = values
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let protected: Vec<String> = value_names
        .iter()
        .filter(|name| IDENTITY_COLUMNS.contains(&name.as_str()))
        .cloned()
        .collect();
    if !protected.is_empty() {
        return Err(HoloError::DuplicateColumn { columns: protected });
    }
    let conflicts: Vec<String> = value_names
        .iter()
        .filter(|name| table.get_column_index(name).is_some())
        .cloned()
        .collect();
    if !conflicts.is_empty() && policy == ReplacePolicy::Reject {
        return Err(HoloError::DuplicateColumn { columns: conflicts });
    }

    let lookup = build_lookup(unit_keys, table_keys, key, values.height())?;
    let mut positions: Vec<Option<IdxSize>> = Vec::with_capacity(table.height());
    for idx in 0..table.height() {
        let position = key_at(table_keys, idx)?.and_then(|key| lookup.get(&key).copied());
        positions.push(position);
    }
    let indices: IdxCa = positions.into_iter().collect();
    let gathered = values.take(&indices)?;

    let mut merged = table.clone();
    for name in &conflicts {
        merged = merged.drop(name)?;
    }
    if !conflicts.is_empty() {
        debug!(key = %key, columns = ?conflicts, "replacing existing columns");
    }
    merged.hstack_mut(gathered.get_columns())?;
    debug!(
        key = %key,
        columns = ?value_names,
        unit_rows = values.height(),
        rows = merged.height(),
        "merged annotation"
    );
    Ok(merged)
}

/// Separates an explicit key column from the value columns.
fn split_key_column(data: &DataFrame, key: JoinKey) -> Result<(Option<&Column>, DataFrame)> {
    let key_name = key.column();
    if data.get_column_index(key_name).is_none() {
        return Ok((None, data.clone()));
    }
    if data.width() == 1 {
        return Err(HoloError::DuplicateColumn {
            columns: vec![key_name.to_string()],
        });
    }
    let keys = data.column(key_name)?;
    Ok((Some(keys), data.drop(key_name)?))
}

/// Key string of row `idx`; null keys have none and never match.
fn key_at(column: &Column, idx: usize) -> Result<Option<String>> {
    Ok(match column.get(idx)? {
        AnyValue::Null => None,
        value => Some(any_to_string(value)),
    })
}

/// Maps each key string to the unit row holding its values.
fn build_lookup(
    unit_keys: Option<&Column>,
    table_keys: &Column,
    key: JoinKey,
    unit_rows: usize,
) -> Result<HashMap<String, IdxSize>> {
    let keys = match unit_keys {
        Some(column) => (0..column.len())
            .map(|idx| key_at(column, idx))
            .collect::<Result<Vec<_>>>()?,
        None => {
            let sorted = sorted_distinct_keys(table_keys)?;
            if sorted.len() != unit_rows {
                return Err(HoloError::Cardinality {
                    key,
                    expected: sorted.len(),
                    actual: unit_rows,
                });
            }
            sorted
        }
    };
    let mut lookup = HashMap::with_capacity(keys.len());
    for (pos, value) in keys.into_iter().enumerate() {
        let Some(value) = value else {
            continue;
        };
        if lookup.contains_key(&value) {
            return Err(HoloError::DuplicateKey { key, value });
        }
        lookup.insert(value, pos as IdxSize);
    }
    Ok(lookup)
}

/// Distinct key values in ascending order, as key strings. A null key keeps
/// its slot so positions line up with `n_unique`.
fn sorted_distinct_keys(keys: &Column) -> Result<Vec<Option<String>>> {
    let unique = keys
        .as_materialized_series()
        .unique()?
        .sort(SortOptions::default())?
        .into_column();
    (0..unique.len()).map(|idx| key_at(&unique, idx)).collect()
}

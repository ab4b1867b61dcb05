//! Annotation input normalization.

use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

use holo_model::{HoloError, Result};

use crate::annotation::{Annotation, AnnotationUnit};

/// Converts a raw annotation into a mergeable unit.
///
/// Tables and named columns pass through unchanged; an unnamed column takes
/// `name`. Bare values and arrays
/// must be one-dimensional and need `name`. Mappings become one column per
/// entry and must have equal lengths.
pub fn normalize(input: Annotation, name: Option<&str>) -> Result<AnnotationUnit> {
    let kind = input.kind();
    match input {
        Annotation::Table(df) => Ok(AnnotationUnit::new(df)),
        Annotation::Column(series) => {
            let series = if series.name().is_empty() {
                let name = name.ok_or(HoloError::MissingName)?;
                series.with_name(name.into())
            } else {
                series
            };
            let df = DataFrame::new(vec![series.into_column()])?;
            Ok(AnnotationUnit::new(df))
        }
        Annotation::Values(series) => {
            if let Some(ndim) = nested_ndim(series.dtype()) {
                return Err(HoloError::Shape { ndim });
            }
            let name = name.ok_or(HoloError::MissingName)?;
            let df = DataFrame::new(vec![series.with_name(name.into()).into_column()])?;
            Ok(AnnotationUnit::new(df))
        }
        Annotation::Array(array) => {
            if array.ndim() != 1 {
                return Err(HoloError::Shape { ndim: array.ndim() });
            }
            let name = name.ok_or(HoloError::MissingName)?;
            let values: Vec<f64> = array.iter().copied().collect();
            let df = DataFrame::new(vec![Column::new(name.into(), values)])?;
            Ok(AnnotationUnit::new(df))
        }
        Annotation::Mapping(entries) => normalize_mapping(entries),
        Annotation::Scalar(value) => Err(HoloError::UnsupportedType {
            kind: format!("{kind} of dtype {}", value.dtype()),
        }),
    }
}

fn normalize_mapping(entries: Vec<(String, Series)>) -> Result<AnnotationUnit> {
    let expected = entries.first().map_or(0, |(_, series)| series.len());
    let mut columns: Vec<Column> = Vec::with_capacity(entries.len());
    for (column, series) in entries {
        if series.len() != expected {
            return Err(HoloError::RaggedMapping {
                column,
                expected,
                actual: series.len(),
            });
        }
        columns.push(series.with_name(column.as_str().into()).into_column());
    }
    Ok(AnnotationUnit::new(DataFrame::new(columns)?))
}

/// Dimensionality of a nested dtype, `None` for flat ones.
fn nested_ndim(dtype: &DataType) -> Option<usize> {
    match dtype {
        DataType::List(inner) | DataType::Array(inner, _) => {
            Some(1 + nested_ndim(inner).unwrap_or(1))
        }
        _ => None,
    }
}

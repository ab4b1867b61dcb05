//! Grouped temporal means over time windows.
//!
//! One engine serves both output shapes: group means are always computed in
//! stacked form and pivoted afterwards when requested.

use std::collections::{HashMap, HashSet};

use polars::prelude::*;
use tracing::{debug, warn};

use holo_common::any_to_string;
use holo_model::{
    AggregationSpec, HoloError, OutputShape, Result, ResultMode, Span, TIME, TimeWindow,
};

const RESPONSE_MEAN: &str = "__response_mean";
const BASELINE_MEAN: &str = "__baseline_mean";

/// Computes per-group means of `spec.value_column` over `spec.window`.
///
/// Groups are sorted by the grouping columns. A baselined window yields
/// `response mean - baseline mean` per group; groups seen in only one of the
/// two windows get null.
pub fn aggregate(table: &DataFrame, spec: &AggregationSpec) -> Result<DataFrame> {
    validate(table, spec)?;
    let stacked = group_means(table, spec)?;
    let result = match spec.shape {
        OutputShape::Stacked => stacked,
        OutputShape::Pivoted => pivot_last(&stacked, &spec.group_columns, &spec.value_column)?,
    };
    debug!(
        groups = ?spec.group_columns,
        value = %spec.value_column,
        window = ?spec.window,
        shape = ?spec.shape,
        rows = result.height(),
        "aggregated group means"
    );
    if spec.result == ResultMode::Shared {
        warn!("aggregation result requested without a copy; do not rely on mutating it in isolation");
    }
    Ok(result)
}

fn validate(table: &DataFrame, spec: &AggregationSpec) -> Result<()> {
    if spec.group_columns.is_empty() {
        return Err(HoloError::EmptyGrouping);
    }
    let mut required: Vec<&str> = spec.group_columns.iter().map(String::as_str).collect();
    required.push(&spec.value_column);
    if spec.window.is_windowed() {
        required.push(TIME);
    }
    for name in required {
        if table.get_column_index(name).is_none() {
            return Err(HoloError::ColumnNotFound(name.to_string()));
        }
    }
    let dtype = table.column(&spec.value_column)?.dtype();
    if !(dtype.is_numeric() || dtype.is_bool()) {
        return Err(HoloError::NonNumericColumn {
            column: spec.value_column.clone(),
            dtype: dtype.to_string(),
        });
    }
    Ok(())
}

fn in_span(span: Span) -> Expr {
    let time = col(TIME).cast(DataType::Float64);
    time.clone().gt(lit(span.lo)).and(time.lt(lit(span.hi)))
}

/// Stacked group means: grouping columns followed by the mean column.
fn group_means(table: &DataFrame, spec: &AggregationSpec) -> Result<DataFrame> {
    let value_name = spec.value_column.as_str();
    let keys: Vec<Expr> = spec
        .group_columns
        .iter()
        .map(|name| col(name.as_str()))
        .collect();
    let value = col(value_name).cast(DataType::Float64);

    let grouped = match spec.window {
        TimeWindow::Whole => table
            .clone()
            .lazy()
            .group_by_stable(keys.clone())
            .agg([value.mean().alias(value_name)]),
        TimeWindow::Span(span) => table
            .clone()
            .lazy()
            .filter(in_span(span))
            .group_by_stable(keys.clone())
            .agg([value.mean().alias(value_name)]),
        TimeWindow::Baselined { baseline, response } => {
            let mut selection = keys.clone();
            selection.push(col(value_name));
            table
                .clone()
                .lazy()
                .filter(in_span(baseline).or(in_span(response)))
                .group_by_stable(keys.clone())
                .agg([
                    value
                        .clone()
                        .filter(in_span(response))
                        .mean()
                        .alias(RESPONSE_MEAN),
                    value.filter(in_span(baseline)).mean().alias(BASELINE_MEAN),
                ])
                .with_column((col(RESPONSE_MEAN) - col(BASELINE_MEAN)).alias(value_name))
                .select(selection)
        }
    };

    let df = grouped
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Spreads the last grouping column across output columns.
///
/// Remaining grouping columns index the rows in their sorted order; pivot
/// columns appear in ascending order of the pivoted values and are named by
/// their display string (`null` for a missing value). Missing combinations
/// are null.
fn pivot_last(stacked: &DataFrame, group_columns: &[String], value_column: &str) -> Result<DataFrame> {
    let (pivot_name, index_names) = group_columns
        .split_last()
        .ok_or(HoloError::EmptyGrouping)?;
    let pivot_column = stacked.column(pivot_name)?;
    let index_columns: Vec<&Column> = index_names
        .iter()
        .map(|name| stacked.column(name))
        .collect::<PolarsResult<_>>()?;
    let means = stacked.column(value_column)?.f64()?;

    let distinct = pivot_column
        .as_materialized_series()
        .unique()?
        .sort(SortOptions::default())?;
    let labels: Vec<String> = (0..distinct.len())
        .map(|idx| Ok(pivot_label(distinct.get(idx)?)))
        .collect::<PolarsResult<_>>()?;
    check_pivot_names(index_names, &labels)?;
    let label_pos: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(pos, label)| (label.as_str(), pos))
        .collect();

    // Stacked rows are sorted by every grouping column, so rows sharing an
    // index tuple are contiguous.
    let mut first_rows: Vec<IdxSize> = Vec::new();
    let mut cells: Vec<(usize, usize, Option<f64>)> = Vec::with_capacity(stacked.height());
    for idx in 0..stacked.height() {
        if idx == 0 || !same_index(&index_columns, idx - 1, idx)? {
            first_rows.push(idx as IdxSize);
        }
        let label = pivot_label(pivot_column.get(idx)?);
        let Some(&column) = label_pos.get(label.as_str()) else {
            continue;
        };
        cells.push((first_rows.len() - 1, column, means.get(idx)));
    }

    let mut grid: Vec<Vec<Option<f64>>> = vec![vec![None; first_rows.len()]; labels.len()];
    for (row, column, mean) in cells {
        grid[column][row] = mean;
    }

    let first_rows = IdxCa::from_vec("first_row".into(), first_rows);
    let mut columns = stacked
        .select(index_names.iter().map(String::as_str))?
        .take(&first_rows)?
        .take_columns();
    for (label, values) in labels.iter().zip(grid) {
        columns.push(Column::new(label.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

fn pivot_label(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        value => any_to_string(value),
    }
}

/// Rows `a` and `b` carry equal values in every index column.
fn same_index(columns: &[&Column], a: usize, b: usize) -> PolarsResult<bool> {
    for column in columns {
        if column.get(a)? != column.get(b)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Output column names must be unique across index columns and pivot labels.
fn check_pivot_names(index_names: &[String], labels: &[String]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut clashes: Vec<String> = Vec::new();
    for name in index_names.iter().chain(labels) {
        if !seen.insert(name.as_str()) && !clashes.contains(name) {
            clashes.push(name.clone());
        }
    }
    if clashes.is_empty() {
        Ok(())
    } else {
        Err(HoloError::PivotNameClash { names: clashes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        // Two cells, one trial, five timepoints, condition per row.
        DataFrame::new(vec![
            Column::new("cell".into(), &[0i64, 0, 0, 0, 0, 1, 1, 1, 1, 1]),
            Column::new("trial".into(), &[0i64; 10]),
            Column::new("time".into(), &[0i64, 1, 2, 3, 4, 0, 1, 2, 3, 4]),
            Column::new(
                "value".into(),
                &[1.0, 2.0, 3.0, 4.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_whole_trace_means() {
        let out = aggregate(&frame(), &AggregationSpec::new(["cell"])).unwrap();
        assert_eq!(out.height(), 2);
        let means = out.column("value").unwrap().f64().unwrap();
        assert_eq!(means.get(0), Some(3.0));
        assert_eq!(means.get(1), Some(30.0));
    }

    #[test]
    fn test_open_interval_excludes_bounds() {
        let spec = AggregationSpec::new(["cell"])
            .with_window(TimeWindow::from_bounds(Some(&[1.0, 3.0])).unwrap());
        let out = aggregate(&frame(), &spec).unwrap();
        let means = out.column("value").unwrap().f64().unwrap();
        assert_eq!(means.get(0), Some(3.0));
        assert_eq!(means.get(1), Some(30.0));
    }

    #[test]
    fn test_baseline_subtraction() {
        // baseline (-1, 1) -> time 0; response (2, 5) -> times 3, 4
        let spec = AggregationSpec::new(["cell"])
            .with_window(TimeWindow::from_bounds(Some(&[-1.0, 1.0, 2.0, 5.0])).unwrap());
        let out = aggregate(&frame(), &spec).unwrap();
        let means = out.column("value").unwrap().f64().unwrap();
        assert_eq!(means.get(0), Some(4.5 - 1.0));
        assert_eq!(means.get(1), Some(45.0 - 10.0));
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["cell", "value"]);
    }

    #[test]
    fn test_group_missing_from_one_window_is_null() {
        let df = DataFrame::new(vec![
            Column::new("cell".into(), &[0i64, 0, 1]),
            Column::new("time".into(), &[0i64, 5, 5]),
            Column::new("value".into(), &[1.0, 3.0, 7.0]),
        ])
        .unwrap();
        let spec = AggregationSpec::new(["cell"])
            .with_window(TimeWindow::from_bounds(Some(&[-1.0, 1.0, 4.0, 6.0])).unwrap());
        let out = aggregate(&df, &spec).unwrap();
        let means = out.column("value").unwrap().f64().unwrap();
        assert_eq!(means.get(0), Some(2.0));
        assert_eq!(means.get(1), None);
    }

    #[test]
    fn test_pivot_single_group_column_is_one_row() {
        let out = aggregate(&frame(), &AggregationSpec::new(["cell"]).pivoted()).unwrap();
        assert_eq!(out.shape(), (1, 2));
        assert_eq!(out.column("0").unwrap().f64().unwrap().get(0), Some(3.0));
        assert_eq!(out.column("1").unwrap().f64().unwrap().get(0), Some(30.0));
    }

    #[test]
    fn test_pivot_rows_follow_values_not_joined_text() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), &["x|y", "x"]),
            Column::new("b".into(), &["z", "y|z"]),
            Column::new("c".into(), &["k", "k"]),
            Column::new("value".into(), &[1.0, 2.0]),
        ])
        .unwrap();
        let spec = AggregationSpec::new(["a", "b", "c"]);
        let stacked = aggregate(&df, &spec).unwrap();
        let pivoted = aggregate(&df, &spec.pivoted()).unwrap();
        assert_eq!(stacked.height(), 2);
        assert_eq!(pivoted.shape(), (2, 3));

        let a: Vec<_> = pivoted.column("a").unwrap().str().unwrap().into_iter().collect();
        let b: Vec<_> = pivoted.column("b").unwrap().str().unwrap().into_iter().collect();
        let k: Vec<_> = pivoted.column("k").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(a, vec![Some("x"), Some("x|y")]);
        assert_eq!(b, vec![Some("y|z"), Some("z")]);
        assert_eq!(k, vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_pivot_null_and_empty_labels_stay_apart() {
        let df = DataFrame::new(vec![
            Column::new("cell".into(), &[0i64, 0]),
            Column::new("stim".into(), &[None, Some("")]),
            Column::new("value".into(), &[1.0, 2.0]),
        ])
        .unwrap();
        let out = aggregate(&df, &AggregationSpec::by_cell(["stim"]).pivoted()).unwrap();
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["cell", "null", ""]);
        assert_eq!(out.column("null").unwrap().f64().unwrap().get(0), Some(1.0));
        assert_eq!(out.column("").unwrap().f64().unwrap().get(0), Some(2.0));
    }

    #[test]
    fn test_pivot_name_clash_is_reported() {
        let df = DataFrame::new(vec![
            Column::new("cell".into(), &[0i64, 0, 1]),
            Column::new("stim".into(), &[Some("null"), None, Some("cell")]),
            Column::new("value".into(), &[1.0, 2.0, 3.0]),
        ])
        .unwrap();
        let err = aggregate(&df, &AggregationSpec::by_cell(["stim"]).pivoted()).unwrap_err();
        match err {
            HoloError::PivotNameClash { names } => assert_eq!(names, vec!["cell", "null"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_errors() {
        let err = aggregate(&frame(), &AggregationSpec::new(Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, HoloError::EmptyGrouping));

        let err = aggregate(&frame(), &AggregationSpec::new(["stim"])).unwrap_err();
        assert!(matches!(err, HoloError::ColumnNotFound(ref name) if name == "stim"));
    }
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};

use holo_common::any_to_string;
use holo_model::TimeWindow;

use crate::types::{FrameDescription, SummaryResult};

pub fn print_summary(result: &SummaryResult) {
    println!("Grouped by: {}", result.groups.join(", "));
    println!("Value: {}", result.value_column);
    println!("Window: {}", describe_window(&result.window));
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
        println!("Rows: {}", result.data.height());
        return;
    }
    println!("{}", frame_table(&result.data));
}

pub fn print_description(description: &FrameDescription) {
    println!("{}", description_table(description));
}

/// Renders a result frame: keys left-aligned, numeric columns right-aligned,
/// nulls dimmed.
pub fn frame_table(data: &DataFrame) -> Table {
    let mut table = Table::new();
    table.set_header(
        data.get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_summary_table_style(&mut table);
    let columns = data.get_columns();
    for (index, column) in columns.iter().enumerate() {
        if column.dtype().is_numeric() {
            align_column(&mut table, index, CellAlignment::Right);
        }
    }
    for row in 0..data.height() {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|column| match column.get(row) {
                Ok(AnyValue::Null) | Err(_) => dim_cell("-"),
                Ok(AnyValue::Float32(v)) => Cell::new(format!("{:.4}", f64::from(v))),
                Ok(AnyValue::Float64(v)) => Cell::new(format!("{v:.4}")),
                Ok(value) => Cell::new(any_to_string(value)),
            })
            .collect();
        table.add_row(cells);
    }
    table
}

pub fn description_table(description: &FrameDescription) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Rows"), Cell::new(description.rows)]);
    table.add_row(vec![Cell::new("Cells"), Cell::new(description.cells)]);
    table.add_row(vec![Cell::new("Trials"), Cell::new(description.trials)]);
    table.add_row(vec![
        Cell::new("Timepoints"),
        Cell::new(description.timepoints),
    ]);
    table.add_row(vec![
        Cell::new("Columns").add_attribute(Attribute::Bold),
        Cell::new(description.columns.join(", ")),
    ]);
    table
}

pub fn describe_window(window: &TimeWindow) -> String {
    match window {
        TimeWindow::Whole => "whole trace".to_string(),
        TimeWindow::Span(span) => format!("({}, {})", span.lo, span.hi),
        TimeWindow::Baselined { baseline, response } => format!(
            "({}, {}) minus baseline ({}, {})",
            response.lo, response.hi, baseline.lo, baseline.hi
        ),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(165);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

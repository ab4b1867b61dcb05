use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use tracing::{info, info_span};

use holo_common::parse_f64_list;
use holo_core::HoloFrame;
use holo_model::{AggregationSpec, AttachOptions, OutputShape, ReplacePolicy, TimeWindow};

use crate::cli::{DescribeArgs, SummarizeArgs};
use crate::types::{FrameDescription, SummaryResult};

pub fn run_summarize(args: &SummarizeArgs) -> Result<SummaryResult> {
    let span = info_span!("summarize", table = %args.table.display());
    let _guard = span.enter();

    let mut frame = load_frame(&args.table)?;
    let mut attach = AttachOptions::new();
    if args.replace {
        attach = attach.with_replace(ReplacePolicy::Replace);
    }
    if let Some(path) = &args.trialwise {
        let annotation = read_csv(path)?;
        frame
            .add_trialwise(annotation, &attach)
            .with_context(|| format!("attach trial-wise table {}", path.display()))?;
    }
    if let Some(path) = &args.cellwise {
        let annotation = read_csv(path)?;
        frame
            .add_cellwise(annotation, &attach)
            .with_context(|| format!("attach cell-wise table {}", path.display()))?;
    }
    if let Some(frame_rate) = args.frame_rate {
        frame.add_seconds(frame_rate)?;
    }

    let window = parse_window(args.window.as_deref())?;
    let shape = if args.wide {
        OutputShape::Pivoted
    } else {
        OutputShape::Stacked
    };
    let spec = AggregationSpec::new(args.by.iter().cloned())
        .with_value_column(args.value.as_str())
        .with_window(window)
        .with_shape(shape);
    let mut data = frame.aggregate(&spec).context("aggregate")?;
    info!(rows = data.height(), columns = data.width(), "summary computed");

    if let Some(path) = &args.output {
        write_csv(&mut data, path)?;
    }
    Ok(SummaryResult {
        groups: spec.group_columns,
        value_column: spec.value_column,
        window: spec.window,
        data,
        output: args.output.clone(),
    })
}

pub fn run_describe(args: &DescribeArgs) -> Result<FrameDescription> {
    let frame = load_frame(&args.table)?;
    Ok(FrameDescription {
        rows: frame.height(),
        cells: frame.n_cells()?,
        trials: frame.n_trials()?,
        timepoints: frame.n_timepoints()?,
        columns: frame.column_names(),
    })
}

/// Parses `--window` bounds into a time window.
pub fn parse_window(raw: Option<&str>) -> Result<TimeWindow> {
    let Some(raw) = raw else {
        return Ok(TimeWindow::Whole);
    };
    let bounds =
        parse_f64_list(raw).ok_or_else(|| anyhow!("invalid --window bounds: {raw:?}"))?;
    Ok(TimeWindow::from_bounds(Some(&bounds))?)
}

fn load_frame(path: &Path) -> Result<HoloFrame> {
    let data = read_csv(path)?;
    HoloFrame::try_new(data).with_context(|| format!("invalid recording table {}", path.display()))
}

pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;
    Ok(df)
}

pub fn write_csv(data: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(data)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

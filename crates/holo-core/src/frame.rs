//! The HoloFrame table type.
//!
//! [`HoloFrame`] wraps a Polars DataFrame holding one row per
//! (cell, trial, time) sample. Augmentation comes in two forms: `add_*`
//! methods mutate the frame in place, `with_*` methods leave it untouched and
//! return a new frame. Aggregation never mutates.

use std::collections::HashSet;

use polars::prelude::{AnyValue, Column, DataFrame, DataType, IntoLazy, col, lit};
use tracing::debug;

use holo_common::{any_to_string, row_key};
use holo_model::{
    AggregationSpec, AttachOptions, CELL, HoloError, IDENTITY_COLUMNS, JoinKey, OutputShape,
    Result, SECONDS, TIME, TRIAL, TimeWindow,
};

use crate::aggregate::aggregate;
use crate::annotation::Annotation;
use crate::augment::{attach, distinct_count};

/// Multi-cell, multi-trial, multi-timepoint recording table.
///
/// Required columns are `cell`, `trial`, `time` and `value`; any further
/// columns are caller-defined conditions or attached annotations. Each
/// (cell, trial, time) triple appears at most once.
#[derive(Debug, Clone)]
pub struct HoloFrame {
    data: DataFrame,
}

impl HoloFrame {
    /// Wraps an existing DataFrame after checking the identity columns and
    /// the uniqueness of (cell, trial, time).
    pub fn try_new(data: DataFrame) -> Result<Self> {
        for name in IDENTITY_COLUMNS {
            if data.get_column_index(name).is_none() {
                return Err(HoloError::ColumnNotFound(name.to_string()));
            }
        }
        let identity: Vec<&Column> = [CELL, TRIAL, TIME]
            .into_iter()
            .map(|name| data.column(name))
            .collect::<std::result::Result<_, _>>()?;
        let mut seen = HashSet::with_capacity(data.height());
        for idx in 0..data.height() {
            if !seen.insert(row_key(&identity, idx)) {
                let cell = |column: &Column| any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
                return Err(HoloError::DuplicateRow {
                    cell: cell(identity[0]),
                    trial: cell(identity[1]),
                    time: cell(identity[2]),
                });
            }
        }
        Ok(Self { data })
    }

    /// Wraps a DataFrame already known to satisfy the invariants.
    pub(crate) fn from_trusted(data: DataFrame) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Distinct values of the `trial` or `cell` column.
    pub fn distinct_count(&self, key: JoinKey) -> Result<usize> {
        distinct_count(&self.data, key)
    }

    pub fn n_cells(&self) -> Result<usize> {
        self.distinct_count(JoinKey::Cell)
    }

    pub fn n_trials(&self) -> Result<usize> {
        self.distinct_count(JoinKey::Trial)
    }

    pub fn n_timepoints(&self) -> Result<usize> {
        Ok(self
            .data
            .column(TIME)?
            .as_materialized_series()
            .n_unique()?)
    }

    // ---------------------------------------------------------------------
    // Augmentation
    // ---------------------------------------------------------------------

    /// Attaches one value (or row) per trial to every row of that trial.
    ///
    /// Replaces existing columns of the same name unless
    /// `options.replace` says otherwise.
    pub fn add_trialwise(
        &mut self,
        values: impl Into<Annotation>,
        options: &AttachOptions,
    ) -> Result<&mut Self> {
        self.data = attach(&self.data, values.into(), JoinKey::Trial, options)?;
        Ok(self)
    }

    /// Copying form of [`HoloFrame::add_trialwise`].
    pub fn with_trialwise(
        &self,
        values: impl Into<Annotation>,
        options: &AttachOptions,
    ) -> Result<Self> {
        let data = attach(&self.data, values.into(), JoinKey::Trial, options)?;
        Ok(Self { data })
    }

    /// Attaches one value (or row) per cell to every row of that cell.
    ///
    /// Rejects existing columns of the same name unless `options.replace`
    /// says otherwise.
    pub fn add_cellwise(
        &mut self,
        values: impl Into<Annotation>,
        options: &AttachOptions,
    ) -> Result<&mut Self> {
        self.data = attach(&self.data, values.into(), JoinKey::Cell, options)?;
        Ok(self)
    }

    /// Copying form of [`HoloFrame::add_cellwise`].
    pub fn with_cellwise(
        &self,
        values: impl Into<Annotation>,
        options: &AttachOptions,
    ) -> Result<Self> {
        let data = attach(&self.data, values.into(), JoinKey::Cell, options)?;
        Ok(Self { data })
    }

    /// Derives `seconds = time / frame_rate`, replacing any existing column.
    pub fn add_seconds(&mut self, frame_rate: f64) -> Result<&mut Self> {
        self.data = seconds_frame(&self.data, frame_rate)?;
        Ok(self)
    }

    /// Copying form of [`HoloFrame::add_seconds`].
    pub fn with_seconds(&self, frame_rate: f64) -> Result<Self> {
        Ok(Self {
            data: seconds_frame(&self.data, frame_rate)?,
        })
    }

    // ---------------------------------------------------------------------
    // Aggregation
    // ---------------------------------------------------------------------

    /// Grouped temporal means as described by `spec`.
    pub fn aggregate(&self, spec: &AggregationSpec) -> Result<DataFrame> {
        aggregate(&self.data, spec)
    }

    /// Means of `value` grouped by `conds`.
    pub fn mean_by<I, S>(&self, conds: I, window: TimeWindow, shape: OutputShape) -> Result<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = AggregationSpec::new(conds)
            .with_window(window)
            .with_shape(shape);
        self.aggregate(&spec)
    }

    /// Means of `value` grouped by `cell`, then `conds`.
    pub fn mean_by_cell<I, S>(
        &self,
        conds: I,
        window: TimeWindow,
        shape: OutputShape,
    ) -> Result<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = AggregationSpec::by_cell(conds)
            .with_window(window)
            .with_shape(shape);
        self.aggregate(&spec)
    }

    /// Means of `value` grouped by `cell`, `trial`, then `conds`.
    pub fn mean_by_trial<I, S>(
        &self,
        conds: I,
        window: TimeWindow,
        shape: OutputShape,
    ) -> Result<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = AggregationSpec::by_trial(conds)
            .with_window(window)
            .with_shape(shape);
        self.aggregate(&spec)
    }
}

impl TryFrom<DataFrame> for HoloFrame {
    type Error = HoloError;

    fn try_from(data: DataFrame) -> Result<Self> {
        Self::try_new(data)
    }
}

fn seconds_frame(data: &DataFrame, frame_rate: f64) -> Result<DataFrame> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(HoloError::InvalidFrameRate(frame_rate));
    }
    if data.get_column_index(TIME).is_none() {
        return Err(HoloError::ColumnNotFound(TIME.to_string()));
    }
    let out = data
        .clone()
        .lazy()
        .with_column((col(TIME).cast(DataType::Float64) / lit(frame_rate)).alias(SECONDS))
        .collect()?;
    debug!(frame_rate, "derived seconds column");
    Ok(out)
}

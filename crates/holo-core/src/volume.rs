//! Building a HoloFrame from a dense trace volume.

use ndarray::ArrayView3;
use polars::prelude::{Column, DataFrame};
use tracing::info;

use holo_model::{AttachOptions, CELL, Result, TIME, TRIAL, VALUE};

use crate::annotation::Annotation;
use crate::frame::HoloFrame;

/// Optional extras applied while unrolling a trace volume.
#[derive(Debug, Clone, Default)]
pub struct VolumeOptions {
    /// One entry per trial, attached trial-wise.
    pub trialwise: Option<Annotation>,
    /// Column name for `trialwise` when it is unnamed.
    pub trialwise_name: Option<String>,
    /// Sampling rate in Hz; adds a `seconds` column when set.
    pub frame_rate: Option<f64>,
}

impl VolumeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trialwise(mut self, values: impl Into<Annotation>, name: impl Into<String>) -> Self {
        self.trialwise = Some(values.into());
        self.trialwise_name = Some(name.into());
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }
}

impl HoloFrame {
    /// Unrolls a `(cells, trials, timepoints)` volume into one row per sample.
    ///
    /// Rows are ordered cell-major, then trial, then time; indices start at 0.
    pub fn from_traces(traces: ArrayView3<'_, f64>, options: VolumeOptions) -> Result<Self> {
        let (n_cells, n_trials, n_time) = traces.dim();
        let rows = traces.len();
        let mut cells = Vec::with_capacity(rows);
        let mut trials = Vec::with_capacity(rows);
        let mut times = Vec::with_capacity(rows);
        let mut values = Vec::with_capacity(rows);
        for ((cell, trial, time), value) in traces.indexed_iter() {
            cells.push(cell as i64);
            trials.push(trial as i64);
            times.push(time as i64);
            values.push(*value);
        }
        let data = DataFrame::new(vec![
            Column::new(CELL.into(), cells),
            Column::new(TRIAL.into(), trials),
            Column::new(TIME.into(), times),
            Column::new(VALUE.into(), values),
        ])?;
        let mut frame = HoloFrame::from_trusted(data);

        if let Some(trialwise) = options.trialwise {
            let attach = AttachOptions {
                name: options.trialwise_name,
                ..AttachOptions::default()
            };
            frame.add_trialwise(trialwise, &attach)?;
        }
        if let Some(frame_rate) = options.frame_rate {
            frame.add_seconds(frame_rate)?;
        }
        info!(
            cells = n_cells,
            trials = n_trials,
            timepoints = n_time,
            rows = frame.height(),
            "built frame from trace volume"
        );
        Ok(frame)
    }
}

//! Time windows for temporal means.

use serde::{Deserialize, Serialize};

use crate::error::{HoloError, Result};

/// Open interval `(lo, hi)` over the `time` column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub lo: f64,
    pub hi: f64,
}

impl Span {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

/// Which rows feed the group means.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeWindow {
    /// Every row, unrestricted by time.
    #[default]
    Whole,
    /// Rows inside one open interval, no baseline subtraction.
    Span(Span),
    /// Response-window mean minus baseline-window mean, per group.
    Baselined { baseline: Span, response: Span },
}

impl TimeWindow {
    /// Builds a window from a flat bound list, dispatching on its length.
    ///
    /// `None` selects the whole trace, `[lo, hi]` a plain span and
    /// `[b_lo, b_hi, r_lo, r_hi]` a baselined response. Every other length is
    /// rejected.
    pub fn from_bounds(bounds: Option<&[f64]>) -> Result<Self> {
        let Some(bounds) = bounds else {
            return Ok(Self::Whole);
        };
        match *bounds {
            [lo, hi] => Ok(Self::Span(Span::new(lo, hi))),
            [b_lo, b_hi, r_lo, r_hi] => Ok(Self::Baselined {
                baseline: Span::new(b_lo, b_hi),
                response: Span::new(r_lo, r_hi),
            }),
            _ => Err(HoloError::InvalidWindow { len: bounds.len() }),
        }
    }

    pub fn is_windowed(&self) -> bool {
        !matches!(self, Self::Whole)
    }
}

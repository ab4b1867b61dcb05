//! Canonical column names and join keys of a HoloFrame.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recorded unit identifier column.
pub const CELL: &str = "cell";
/// Repeated run identifier column.
pub const TRIAL: &str = "trial";
/// Sample index (or timestamp) column.
pub const TIME: &str = "time";
/// Primary measured quantity column.
pub const VALUE: &str = "value";
/// Derived `time / frame_rate` column.
pub const SECONDS: &str = "seconds";

/// Identity columns every HoloFrame must carry.
pub const IDENTITY_COLUMNS: [&str; 4] = [CELL, TRIAL, TIME, VALUE];

/// Column an annotation is joined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKey {
    /// One annotation value per trial, broadcast over cells and timepoints.
    Trial,
    /// One annotation value per cell, broadcast over trials and timepoints.
    Cell,
}

impl JoinKey {
    /// Column name of the key.
    pub fn column(self) -> &'static str {
        match self {
            Self::Trial => TRIAL,
            Self::Cell => CELL,
        }
    }

    /// Default conflict policy when the caller does not choose one.
    ///
    /// Trial-wise attaches replace existing columns, cell-wise attaches reject
    /// them.
    pub fn default_policy(self) -> ReplacePolicy {
        match self {
            Self::Trial => ReplacePolicy::Replace,
            Self::Cell => ReplacePolicy::Reject,
        }
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// What to do when an attached column name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacePolicy {
    /// Drop the existing column(s), then attach.
    Replace,
    /// Fail with a duplicate-column error.
    Reject,
}

impl From<bool> for ReplacePolicy {
    fn from(replace: bool) -> Self {
        if replace { Self::Replace } else { Self::Reject }
    }
}

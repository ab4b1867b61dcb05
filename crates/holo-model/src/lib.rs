//! HoloFrame data model.
//!
//! Schema constants, join keys, time windows, aggregation specs and the
//! shared error type used by every HoloFrame crate.

pub mod error;
pub mod options;
pub mod schema;
pub mod window;

pub use error::{ErrorKind, HoloError, Result};
pub use options::{AggregationSpec, AttachOptions, OutputShape, ResultMode};
pub use schema::{
    CELL, IDENTITY_COLUMNS, JoinKey, ReplacePolicy, SECONDS, TIME, TRIAL, VALUE,
};
pub use window::{Span, TimeWindow};

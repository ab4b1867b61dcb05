//! Shared utilities for HoloFrame crates.
//!
//! Helpers for turning polars `AnyValue`s into display strings, numbers and
//! composite row keys.

pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use polars::{any_to_string, format_numeric, parse_f64, parse_f64_list, row_key};

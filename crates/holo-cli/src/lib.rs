//! CLI library components for the holoframe tool.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;

//! CLI command handlers
//!
//! Thin adapters over `utmi_core`: each subcommand reads its inputs, calls
//! the library and prints JSON (or TOML) to stdout.

pub mod coefficients;
pub mod cv;
pub mod dashboard;
pub mod helpers;
pub mod income;
pub mod valuate;

//! Shared helpers

pub mod numeric;

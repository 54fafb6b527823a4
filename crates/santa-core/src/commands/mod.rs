//! Commands module - operations as library functions
//!
//! These are what the CLI calls; each one runs a full pipeline.

pub mod draw;

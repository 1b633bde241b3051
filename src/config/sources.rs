//! Configuration file sources.

pub mod explicit_file;
pub mod global_file;

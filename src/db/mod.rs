//! Database access layer

pub mod catalog;
pub mod mappings;
pub mod sync_runs;

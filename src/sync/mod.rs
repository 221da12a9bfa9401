//! Cost resolution and the full re-sync sweep

pub mod cost;
pub mod full;

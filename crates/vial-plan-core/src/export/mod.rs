//! Report rendering for comparison results.

mod report;

pub use report::*;

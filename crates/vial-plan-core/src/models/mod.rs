//! Domain models for the vial planner.

mod plan;
mod request;
mod vial;

pub use plan::*;
pub use request::*;
pub use vial::*;

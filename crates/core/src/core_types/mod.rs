//! Core types and utilities

pub mod chemical;
pub mod geo;
pub mod math;
pub mod output;
pub mod scenario;
pub mod toxicology;
pub mod units;
pub mod weather;

pub use chemical::*;
pub use geo::*;
pub use output::*;
pub use scenario::*;
pub use toxicology::*;
pub use weather::*;

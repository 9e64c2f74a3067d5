//! Panel rendering, one module per tab kind.

pub mod geo;
pub mod overview;
pub mod region;

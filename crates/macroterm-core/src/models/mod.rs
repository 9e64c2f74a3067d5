//! Data models for the dashboard snapshot.
//!
//! The snapshot is produced by an external daily batch and treated as
//! opaque input. These types mirror its JSON shape:
//!
//! - `Dashboard`: the top-level document
//! - `RiskState`, `Driver`: the global risk pulse
//! - `Region`, `Verdict`, `Block`, `Item`: per-region detail
//! - `Geo`, `Metric`, `Hotspot`: geopolitical and policy risk
//! - `Signal`, `MetricValue`: shared value types

pub mod dashboard;
pub mod signal;

pub use dashboard::{
    Block, Dashboard, Driver, Geo, Hotspot, Item, Metric, MetricValue, Region, RiskState, Verdict,
};
pub use signal::Signal;

//! Dashboard snapshot loader.
//!
//! This module provides the `DashboardClient`, which fetches
//! `data/dashboard.json` through the offline worker and parses it
//! defensively. It also defines `LoadError`, whose `Aborted` variant lets
//! callers tell a user cancel apart from a genuine failure.

pub mod client;
pub mod error;

pub use client::{abort_pair, DashboardClient, Loaded, DASHBOARD_PATH};
pub use error::LoadError;

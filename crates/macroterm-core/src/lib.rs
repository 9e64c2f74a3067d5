//! Core library for macroterm.
//!
//! This crate holds everything the dashboard needs that is not terminal
//! specific:
//!
//! - `models`: the dashboard snapshot document and its defaults
//! - `api`: the snapshot loader and its error type
//! - `cache`: the offline cache worker, its storage and network transport
//! - `state`: the view-state controller (snapshot, error, loading, tab)
//! - `view`: pure panel view models derived from a snapshot
//! - `config`: user configuration
//! - `utils`: small formatting helpers

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod state;
pub mod utils;
pub mod view;

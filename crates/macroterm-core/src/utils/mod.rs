//! Utility functions for value and timestamp formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{fmt_utc, format_number, truncate_string};

//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering and layout
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and signal styling
//! - `widgets`: Signal pills and other small shared pieces
//! - `tabs`: Panel rendering (overview, region, geo)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
pub mod widgets;

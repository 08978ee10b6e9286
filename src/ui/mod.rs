//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard and mouse input handling
//! - `render` - View rendering dispatch and overlays
//! - `helpers` - Panic capture for background tasks, layout helpers
//! - `navbar` - Category tabs and session summary
//! - `articles` - Headline list widget
//! - `status` - Status bar widget

mod articles;
pub(crate) mod helpers;
mod input;
mod loop_runner;
mod navbar;
mod render;
mod status;

pub use articles::format_relative_time;
pub use loop_runner::{run, Action};

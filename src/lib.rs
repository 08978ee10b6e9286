//! Terminal news dashboard: categorized headlines from a news aggregator,
//! optionally translated, behind a signed-in session.

pub mod app;
pub mod auth;
pub mod config;
pub mod cycle;
pub mod feed;
pub mod guard;
pub mod keybindings;
pub mod menu;
pub mod session;
pub mod theme;
pub mod translate;
pub mod ui;
pub mod util;

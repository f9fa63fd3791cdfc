//! Headless forecast map viewer.
//!
//! Drives a [`MapSession`](map_view::MapSession) against a recording surface
//! and writes what a browser map would show: the overlay as PNG, the legend as
//! HTML and point-query popups as text and HTML.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command};
pub use config::{ConfigError, ViewerConfig};

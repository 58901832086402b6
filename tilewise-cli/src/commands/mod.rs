//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, path, show)
//! - [`run`] - Process tiles for every time period
//! - [`search`] - Show catalog items for single tiles
//! - [`tiles`] - List the selected tiles and their search bounds

pub mod common;
pub mod config;
pub mod run;
pub mod search;
pub mod tiles;

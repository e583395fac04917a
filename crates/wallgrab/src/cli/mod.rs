//! Command implementations for the wallgrab CLI.

pub mod config;
pub mod download;
pub mod interactive;

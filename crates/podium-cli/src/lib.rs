//! Speaking-time tracker CLI library.
//!
//! This crate provides the console interface for the speaking-time tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;

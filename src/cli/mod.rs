//! Command-line interface for playlint.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`discovery`] - Finding the files to lint

pub mod args;
pub mod commands;
pub mod discovery;

pub use args::Cli;
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use discovery::{discover, Excludes};

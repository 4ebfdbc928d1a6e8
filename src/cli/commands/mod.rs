//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed via [`CommandDispatcher`]: `--list-rules` and `--list-tags` go to
//! the list command, everything else lints.

pub mod dispatcher;
pub mod lint;
pub mod list;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

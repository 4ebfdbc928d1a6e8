//! Built-in lint rules.
//!
//! This module contains the rules that ship with playlint.

pub mod fqcn;
pub mod only_builtins;

pub use fqcn::FqcnRule;
pub use only_builtins::OnlyBuiltinsRule;

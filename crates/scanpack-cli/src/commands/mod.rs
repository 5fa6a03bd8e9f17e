//! Subcommand implementations.

pub mod compress;
pub mod create;
pub mod extract;

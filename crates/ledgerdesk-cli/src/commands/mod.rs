//! Subcommand implementations.

pub mod session;

//! Session persistence and client construction for the CLI.

pub mod storage;

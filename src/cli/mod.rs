//! CLI module for the u2net-serve binary
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{
    main, run, Cli, CliBackend, CliExecutionProvider, CliLogFormat, CliModelKind,
};

//! Command-line interface: argument parsing and headless subcommands.

pub mod args;
pub mod commands;

//! Tests for the CLI module
//!
//! Argument parsing, config file validation and precedence between the
//! command line, the config file and the defaults.

pub mod args_tests;

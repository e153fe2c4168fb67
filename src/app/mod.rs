//! Application module

pub mod cli;
pub mod report;
pub mod startup;

//! Scenario Integration Test Modules

pub mod cancellation;
pub mod draining;

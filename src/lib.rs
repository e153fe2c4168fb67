pub mod app;
pub mod core;
pub mod pipeline;
pub mod queue;

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Parse the config schema version string from the build script into u32
pub fn get_config_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION.parse().unwrap_or(1)
}

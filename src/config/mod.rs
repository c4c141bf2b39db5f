//! Configuration loading and validation.
mod loader;
mod parse;
mod resolve;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::{DEFAULT_CONFIG_FILES, load_config};
pub use parse::parse_duration_value;
pub use resolve::{MasterConfig, SlaveConfig, resolve_master, resolve_slave};

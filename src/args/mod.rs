//! CLI argument types and positive-number newtypes.
mod cli;
mod types;

#[cfg(test)]
mod tests;

pub use cli::CliArgs;
pub use types::{PositiveU64, PositiveUsize};

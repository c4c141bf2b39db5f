//! Target loading, single-attempt execution, and the rate-limited dispatcher.
mod attempt;
mod client;
mod dispatch;
mod params;
mod targets;


pub use attempt::execute_attempt;
pub use client::{DEFAULT_USER_AGENT, build_attempt_client};
pub use dispatch::{DispatchOutcome, dispatch};
pub use params::DispatchParameters;
pub use targets::{load_targets, parse_targets, validate_targets};

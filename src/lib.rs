//! Core library for the `webswarm` CLI.
//!
//! `webswarm` is a distributed HTTP load generator. Slaves fire paced GET
//! requests at a target list and report one record per attempt; the master
//! starts its slaves, collects their batches, and writes the merged report.
//! The binary wires these pieces to a config file and two CLI modes.
pub mod args;
pub mod config;
pub mod distributed;
pub mod error;
pub mod http;
pub mod metrics;
pub mod system;

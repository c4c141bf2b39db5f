//! Master/slave coordination over JSON-over-HTTP.
//!
//! A slave serves `/initUrls` and `/stress`; when started it runs the
//! dispatcher and posts its records to the master's `/result`. The master
//! broadcasts the start signal and aggregates once every slave has reported.
mod client;
mod http;
mod master;
mod protocol;
mod slave;


pub use client::ControlClient;
pub use master::{BatchOutcome, MasterNode, RunState, run_master};
pub use protocol::{Ack, INIT_URLS_PATH, RESULT_PATH, STRESS_PATH, WireDispatchParams};
pub use slave::{HttpReportTransport, ReportTransport, SlaveNode, run_slave};

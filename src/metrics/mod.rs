//! Outcome records, the shared record store, and run statistics.
mod histogram;
mod report;
mod store;
mod summary;
mod types;


pub use histogram::LatencyHistogram;
pub use report::{
    distinct_errors, format_x100, print_summary, summary_lines, write_error_log, write_report,
    write_summary_json,
};
pub use store::RecordStore;
pub use summary::summarize;
pub use types::{OK_STATUS, OutcomeRecord, RunSummary, TRANSPORT_ERROR_STATUS, now_unix_nanos};

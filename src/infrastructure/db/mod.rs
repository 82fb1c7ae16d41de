pub mod connection;
pub mod dom_snapshots;
pub mod error_logs;
pub mod network_requests;

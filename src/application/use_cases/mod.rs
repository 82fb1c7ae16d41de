pub mod dom_snapshot;
pub mod error_log;
pub mod network_request;
pub mod script;

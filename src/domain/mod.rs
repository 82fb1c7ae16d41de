pub mod dom_snapshot;
pub mod error;
pub mod error_log;
pub mod network_request;
pub mod pagination;
pub mod session;

pub mod instrumentation;
pub mod use_cases;

pub use instrumentation::{HostPrimitives, Instrumentation, InstrumentationConfig};
pub use use_cases::dom_snapshot::DomSnapshotUseCase;
pub use use_cases::error_log::ErrorLogUseCase;
pub use use_cases::network_request::NetworkRequestUseCase;
pub use use_cases::script::ScriptUseCase;

pub mod log_entry;
pub mod system;

pub use log_entry::{LogEntry, LogLevel, LogSource};
pub use system::LogTrailSystem;

//! Load-once engine runtime and the views that evaluate on it.

pub mod engine;
pub mod python;
pub mod shared;
pub mod view;

#[cfg(test)]
pub mod testing;

pub use engine::{display_value, Engine, EngineLoader};
pub use python::PythonProcessLoader;
pub use shared::{RuntimeStatus, SharedRuntime};
pub use view::{EvaluationRequest, EvaluatorView, ViewPhase, ViewSnapshot, ViewState};

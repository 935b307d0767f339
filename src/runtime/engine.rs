use crate::error::EngineError;
use serde_json::Value;
use std::sync::Arc;

/// A loaded code-evaluation engine.
pub trait Engine: Send + Sync {
    /// Run a snippet and return its value.
    fn run(&self, code: &str) -> Result<Value, EngineError>;

    /// Human-readable engine name, e.g. `Python 3.12.1`.
    fn name(&self) -> &str;
}

/// Capability that produces an [`Engine`]. The shared runtime calls
/// [`EngineLoader::load`] at most once.
pub trait EngineLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Engine>, EngineError>;

    fn describe(&self) -> String;
}

/// Coerce an engine value into the text a view displays.
///
/// `null` renders as nothing, strings render verbatim, everything else
/// renders as its compact JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

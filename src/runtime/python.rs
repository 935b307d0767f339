//! Native engine backed by a local Python interpreter.
//!
//! Each snippet runs in a fresh `<interpreter> -c <code>` process, so there is
//! no state shared between views. The value of a snippet is whatever it
//! printed.

use super::engine::{Engine, EngineLoader};
use crate::error::EngineError;
use crate::utils::CommandExecutor;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

pub struct PythonProcessLoader {
    interpreter: String,
    working_dir: Option<PathBuf>,
}

impl PythonProcessLoader {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl EngineLoader for PythonProcessLoader {
    fn load(&self) -> Result<Arc<dyn Engine>, EngineError> {
        if !CommandExecutor::is_tool_installed(&self.interpreter) {
            return Err(EngineError::InterpreterNotFound {
                interpreter: self.interpreter.clone(),
            });
        }

        let version = CommandExecutor::tool_version(&self.interpreter).ok_or_else(|| {
            EngineError::load_failed(format!("{} --version did not answer", self.interpreter))
        })?;

        Ok(Arc::new(PythonProcessEngine {
            interpreter: self.interpreter.clone(),
            version,
            working_dir: self.working_dir.clone(),
        }))
    }

    fn describe(&self) -> String {
        format!("{} (subprocess)", self.interpreter)
    }
}

pub struct PythonProcessEngine {
    interpreter: String,
    version: String,
    working_dir: Option<PathBuf>,
}

impl Engine for PythonProcessEngine {
    fn run(&self, code: &str) -> Result<Value, EngineError> {
        let output =
            CommandExecutor::execute_command(&self.interpreter, &["-c", code], self.working_dir.as_deref())
                .map_err(|e| {
                    EngineError::evaluation_failed(format!("Failed to run {}: {e}", self.interpreter))
                })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("{} exited with {}", self.interpreter, output.status),
                detail => detail.to_string(),
            };
            return Err(EngineError::evaluation_failed(message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Value::String(stdout.trim_end().to_string()))
    }

    fn name(&self) -> &str {
        &self.version
    }
}

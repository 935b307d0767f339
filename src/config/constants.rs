//! Constants used throughout pyview

/// Server PID file
pub const PID_FILE: &str = "/tmp/pyview_server.pid";

/// Default server port
pub const DEFAULT_PORT: u16 = 8420;

/// Project-local config file name
pub const CONFIG_FILE_NAME: &str = "pyview.toml";

/// Environment variable overriding the global config directory
pub const CONFIG_PATH_ENV: &str = "PYVIEW_CONFIG_PATH";

/// Where the browser fetches the Pyodide distribution from
pub const DEFAULT_INDEX_URL: &str = "https://cdn.jsdelivr.net/pyodide/dev/full/";

/// Loader script inside the index URL
pub const PYODIDE_SCRIPT: &str = "pyodide.js";

/// Interpreter used by the native engine
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Snippet evaluated by the demo view
pub const DEMO_CODE: &str = "print(3+5)";

pub const DEFAULT_LOADING_MESSAGE: &str = "loading...";
pub const DEFAULT_EVALUATING_MESSAGE: &str = "evaluating...";

/// Shown instead of the error detail when a snippet fails
pub const EVALUATION_ERROR_MESSAGE: &str = "Error evaluating Python code. See console for details.";

/// Shown by every view when the engine never loaded
pub const ENGINE_UNAVAILABLE_MESSAGE: &str = "Python engine unavailable. See console for details.";

/// Prefix in front of each view's display
pub const OUTPUT_LABEL: &str = "Python Output";

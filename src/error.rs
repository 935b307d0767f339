use thiserror::Error;

/// The main error type for pyview operations
#[derive(Error, Debug)]
pub enum PyviewError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path-related errors
    #[error("Path error: {message}")]
    Path { message: String },

    /// Engine load or evaluation errors
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Server errors
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Command execution errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors raised by an engine loader or a loaded engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The interpreter binary could not be located
    #[error("Python interpreter not found: {interpreter}. Please install it or set engine.interpreter")]
    InterpreterNotFound { interpreter: String },

    /// Loading the engine failed
    #[error("Failed to load engine: {reason}")]
    LoadFailed { reason: String },

    /// The shared engine settled without loading
    #[error("Python engine unavailable: {reason}")]
    Unavailable { reason: String },

    /// Running a snippet failed
    #[error("Evaluation failed: {message}")]
    EvaluationFailed { message: String },
}

/// Server-related errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Server startup failed
    #[error("Failed to start server on port {port}: {reason}")]
    StartupFailed { port: u16, reason: String },

    /// Server not running
    #[error("No server is currently running")]
    NotRunning,

    /// Failed to stop server
    #[error("Failed to stop server with PID {pid}: {reason}")]
    StopFailed { pid: u32, reason: String },
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid arguments
    #[error("Invalid command arguments: {message}")]
    InvalidArguments { message: String },

    /// Waiting for views gave up
    #[error("Timed out after {seconds}s waiting for {pending} view(s)")]
    TimedOut { seconds: u64, pending: usize },

    /// One or more environment checks failed
    #[error("{failed} check(s) failed")]
    ChecksFailed { failed: usize },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be parsed
    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The config could not be serialized
    #[error("Failed to serialize config: {reason}")]
    Serialize { reason: String },

    /// A field holds an unusable value
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// No views configured
    #[error("At least one [[views]] entry is required")]
    NoViews,

    /// Two views share a DOM id
    #[error("Duplicate view id: {id}")]
    DuplicateViewId { id: String },
}

/// Result type alias for pyview operations
pub type Result<T> = std::result::Result<T, PyviewError>;

/// Specialized result type for configuration handling
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl PyviewError {
    /// new path error
    pub fn path(message: impl Into<String>) -> Self {
        Self::Path {
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn add_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Get suggested actions for the error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            PyviewError::Engine(EngineError::InterpreterNotFound { interpreter }) => vec![
                format!("Install {interpreter} using your package manager"),
                "Or point [engine].interpreter in pyview.toml at an existing binary".to_string(),
            ],
            PyviewError::Engine(EngineError::Unavailable { .. }) => {
                vec!["Run 'pyview check' to diagnose the engine".to_string()]
            }
            PyviewError::Config(ConfigError::NoViews) => {
                vec!["Run 'pyview init' to create a config with a sample view".to_string()]
            }
            PyviewError::Server(ServerError::StartupFailed { .. }) => {
                vec!["Try another port with --port".to_string()]
            }
            _ => vec![],
        }
    }
}

impl EngineError {
    /// new load failed error
    pub fn load_failed(reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            reason: reason.into(),
        }
    }

    /// new evaluation failed error
    pub fn evaluation_failed(message: impl Into<String>) -> Self {
        Self::EvaluationFailed {
            message: message.into(),
        }
    }
}

impl ServerError {
    /// new startup failed error
    pub fn startup_failed(port: u16, reason: impl Into<String>) -> Self {
        Self::StartupFailed {
            port,
            reason: reason.into(),
        }
    }
}

impl CommandError {
    /// new invalid arguments error
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// new invalid value error
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

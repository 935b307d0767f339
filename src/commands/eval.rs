use crate::config::{config_dir, PyviewConfig};
use crate::debug_println;
use crate::error::{CommandError, EngineError, PyviewError, Result};
use crate::logging::{LogLevel, LogTrailSystem};
use crate::runtime::{
    EngineLoader, EvaluationRequest, EvaluatorView, PythonProcessLoader, RuntimeStatus,
    SharedRuntime, ViewSnapshot,
};
use crate::ui::print_view_results;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Views after evaluation, with the final engine status
pub struct EvalOutcome {
    pub status: RuntimeStatus,
    pub views: Vec<EvaluatorView>,
}

impl EvalOutcome {
    pub fn engine_label(&self) -> String {
        match &self.status {
            RuntimeStatus::Ready(engine) => engine.name().to_string(),
            RuntimeStatus::Unavailable(_) => "engine unavailable".to_string(),
            RuntimeStatus::Pending => "engine still loading".to_string(),
        }
    }

    pub fn snapshots(&self) -> Vec<ViewSnapshot> {
        self.views.iter().map(|view| view.snapshot()).collect()
    }

    pub fn pending(&self) -> usize {
        self.views
            .iter()
            .filter(|view| !view.state().is_final())
            .count()
    }
}

/// Handle eval command
pub fn handle_eval_command(
    code: &[String],
    config: Option<&Path>,
    interpreter: Option<String>,
    timeout: u64,
    json: bool,
) -> Result<()> {
    if timeout == 0 {
        return Err(CommandError::invalid_arguments("--timeout must be at least 1 second").into());
    }

    let (config, source) = PyviewConfig::load(config)?;
    debug_println!("Using config: {:?}", source);

    let requests = if code.is_empty() {
        config.views.clone()
    } else {
        if code.iter().any(|snippet| snippet.trim().is_empty()) {
            return Err(CommandError::invalid_arguments("--code must not be empty").into());
        }
        code.iter().map(EvaluationRequest::new).collect()
    };

    let interpreter = interpreter.unwrap_or(config.engine.interpreter);
    let mut loader = PythonProcessLoader::new(interpreter);
    // inline snippets run in the current directory, not next to the config
    if code.is_empty() {
        if let Some(dir) = source.as_deref().and_then(config_dir) {
            loader = loader.with_working_dir(dir);
        }
    }
    let loader = Arc::new(loader);
    let outcome = evaluate(requests, loader, Duration::from_secs(timeout));

    if json {
        let output = serde_json::to_string_pretty(&outcome.snapshots())
            .map_err(|e| PyviewError::add_context("Failed to encode views", e))?;
        println!("{output}");
    } else {
        print_view_results(&outcome.engine_label(), &outcome.views);
    }

    if let RuntimeStatus::Unavailable(reason) = &outcome.status {
        return Err(EngineError::Unavailable {
            reason: reason.clone(),
        }
        .into());
    }

    match outcome.pending() {
        0 => Ok(()),
        pending => Err(CommandError::TimedOut {
            seconds: timeout,
            pending,
        }
        .into()),
    }
}

/// Mount every request on one shared runtime and wait for all of them.
pub fn evaluate(
    requests: Vec<EvaluationRequest>,
    loader: Arc<dyn EngineLoader>,
    timeout: Duration,
) -> EvalOutcome {
    let logs = LogTrailSystem::new().with_echo();
    let runtime = SharedRuntime::new(loader, logs.clone());

    let views: Vec<EvaluatorView> = requests
        .into_iter()
        .map(|request| EvaluatorView::new(request, logs.clone()))
        .collect();

    for view in &views {
        view.mount(&runtime);
    }

    let started = Instant::now();
    let deadline = started.checked_add(timeout);
    let status = runtime.wait_settled(Some(timeout));
    debug_println!("Engine settled as {:?} after {:?}", status, started.elapsed());

    for view in &views {
        let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        if !view.wait_done(remaining) {
            debug_println!("View '{}' still pending", view.request().label());
        }
    }

    let errors = logs.count_level(LogLevel::Error);
    if errors > 0 {
        debug_println!("{} error(s) logged during evaluation", errors);
    }

    EvalOutcome {
        status: runtime.status(),
        views,
    }
}

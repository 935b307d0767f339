use super::engine::{display_value, Engine};
use super::shared::{RuntimeStatus, SharedRuntime};
use crate::config::{
    DEFAULT_EVALUATING_MESSAGE, DEFAULT_LOADING_MESSAGE, ENGINE_UNAVAILABLE_MESSAGE,
    EVALUATION_ERROR_MESSAGE, OUTPUT_LABEL,
};
use crate::logging::{LogEntry, LogSource, LogTrailSystem};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

fn default_loading_message() -> String {
    DEFAULT_LOADING_MESSAGE.to_string()
}

fn default_evaluating_message() -> String {
    DEFAULT_EVALUATING_MESSAGE.to_string()
}

/// What a view evaluates and what it shows while it waits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    #[serde(default = "default_loading_message")]
    pub loading_message: String,
    #[serde(default = "default_evaluating_message")]
    pub evaluating_message: String,
}

impl EvaluationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
            loading_message: default_loading_message(),
            evaluating_message: default_evaluating_message(),
        }
    }

    #[allow(dead_code)]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    #[allow(dead_code)]
    pub fn with_evaluating_message(mut self, message: impl Into<String>) -> Self {
        self.evaluating_message = message.into();
        self
    }

    /// Short name used in diagnostics: the id, or the first line of code.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => {
                let first = self.code.lines().next().unwrap_or_default();
                if first.chars().count() > 24 {
                    format!("{}...", first.chars().take(24).collect::<String>())
                } else {
                    first.to_string()
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Waiting for the engine
    Loading,
    /// Waiting for this view's snippet
    Evaluating,
    Done(String),
    /// The engine never loaded
    Unavailable,
}

impl ViewState {
    pub fn is_final(&self) -> bool {
        matches!(self, ViewState::Done(_) | ViewState::Unavailable)
    }

    pub fn phase(&self) -> ViewPhase {
        match self {
            ViewState::Loading => ViewPhase::Loading,
            ViewState::Evaluating => ViewPhase::Evaluating,
            ViewState::Done(_) => ViewPhase::Done,
            ViewState::Unavailable => ViewPhase::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPhase {
    Loading,
    Evaluating,
    Done,
    Unavailable,
}

impl ViewPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewPhase::Loading => "loading",
            ViewPhase::Evaluating => "evaluating",
            ViewPhase::Done => "done",
            ViewPhase::Unavailable => "unavailable",
        }
    }
}

/// Serializable picture of a view at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub id: Option<String>,
    pub phase: ViewPhase,
    pub display: String,
}

struct ViewShared {
    label: String,
    state: Mutex<ViewState>,
    changed: Condvar,
    logs: LogTrailSystem,
}

impl ViewShared {
    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, next: ViewState) {
        *self.lock() = next;
        self.changed.notify_all();
    }

    fn evaluate(&self, engine: Arc<dyn Engine>, code: &str) {
        let display = match panic::catch_unwind(AssertUnwindSafe(|| engine.run(code))) {
            Ok(Ok(value)) => display_value(&value),
            Ok(Err(e)) => self.report_failure(e.to_string()),
            Err(_) => self.report_failure(format!("{} panicked while evaluating", engine.name())),
        };
        self.transition(ViewState::Done(display));
    }

    fn report_failure(&self, detail: String) -> String {
        self.logs
            .log(LogEntry::error(LogSource::View(self.label.clone()), detail));
        EVALUATION_ERROR_MESSAGE.to_string()
    }
}

/// One snippet, evaluated once on the shared engine.
pub struct EvaluatorView {
    request: EvaluationRequest,
    shared: Arc<ViewShared>,
    mounted: AtomicBool,
}

impl EvaluatorView {
    pub fn new(request: EvaluationRequest, logs: LogTrailSystem) -> Self {
        Self {
            shared: Arc::new(ViewShared {
                label: request.label(),
                state: Mutex::new(ViewState::Loading),
                changed: Condvar::new(),
                logs,
            }),
            request,
            mounted: AtomicBool::new(false),
        }
    }

    pub fn request(&self) -> &EvaluationRequest {
        &self.request
    }

    /// Make sure the engine is loading and evaluate once it is ready.
    /// Only the first call has any effect.
    pub fn mount(&self, runtime: &Arc<SharedRuntime>) {
        if self.mounted.swap(true, Ordering::AcqRel) {
            return;
        }

        runtime.ensure_initialization_started();

        let shared = Arc::clone(&self.shared);
        let code = self.request.code.clone();
        runtime.on_settled(move |status| match status {
            RuntimeStatus::Ready(engine) => {
                shared.transition(ViewState::Evaluating);

                let engine = Arc::clone(engine);
                let worker = Arc::clone(&shared);
                let spawned = thread::Builder::new()
                    .name("pyview-eval".to_string())
                    .spawn(move || worker.evaluate(engine, &code));

                if let Err(e) = spawned {
                    let display = shared.report_failure(format!("Failed to spawn evaluation: {e}"));
                    shared.transition(ViewState::Done(display));
                }
            }
            RuntimeStatus::Unavailable(_) => shared.transition(ViewState::Unavailable),
            RuntimeStatus::Pending => {}
        });
    }

    #[allow(dead_code)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ViewState {
        self.shared.lock().clone()
    }

    fn display_for(&self, state: &ViewState) -> String {
        match state {
            ViewState::Loading => self.request.loading_message.clone(),
            ViewState::Evaluating => self.request.evaluating_message.clone(),
            ViewState::Done(result) => result.clone(),
            ViewState::Unavailable => ENGINE_UNAVAILABLE_MESSAGE.to_string(),
        }
    }

    /// Text the view currently shows.
    pub fn render(&self) -> String {
        self.display_for(&self.shared.lock())
    }

    pub fn render_line(&self) -> String {
        format!("{OUTPUT_LABEL}: {}", self.render())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.shared.lock();
        ViewSnapshot {
            id: self.request.id.clone(),
            phase: state.phase(),
            display: self.display_for(&state),
        }
    }

    /// Block until the view reaches `Done` or `Unavailable`. Returns `false`
    /// if `timeout` elapsed first.
    pub fn wait_done(&self, timeout: Option<Duration>) -> bool {
        // a timeout too large to represent waits forever
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.shared.lock();

        while !state.is_final() {
            state = match deadline {
                None => self
                    .shared
                    .changed
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    self.shared
                        .changed
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .0
                }
            };
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::logging::LogLevel;
    use crate::runtime::testing::{BlockingLoader, FailingLoader, StubLoader};
    use serde_json::json;
    use std::sync::Barrier;

    const WAIT: Option<Duration> = Some(Duration::from_secs(5));

    fn view(code: &str, logs: &LogTrailSystem) -> EvaluatorView {
        EvaluatorView::new(EvaluationRequest::new(code), logs.clone())
    }

    #[test]
    fn test_request_defaults() {
        let request = EvaluationRequest::new("print(3+5)");
        assert_eq!(request.id, None);
        assert_eq!(request.loading_message, "loading...");
        assert_eq!(request.evaluating_message, "evaluating...");
        assert_eq!(request.label(), "print(3+5)");
        assert_eq!(request.clone().with_id("sum").label(), "sum");

        let long = EvaluationRequest::new("x = [i * i for i in range(100)]\nprint(x)");
        assert_eq!(long.label(), "x = [i * i for i in rang...");
    }

    #[test]
    fn test_renders_loading_message_until_ready() {
        let logs = LogTrailSystem::new();
        let (loader, release) = BlockingLoader::new(json!(8));
        let runtime = SharedRuntime::new(loader, logs.clone());

        let first = EvaluatorView::new(
            EvaluationRequest::new("print(1)").with_loading_message("warming up"),
            logs.clone(),
        );
        let second = view("print(2)", &logs);
        first.mount(&runtime);
        second.mount(&runtime);

        assert_eq!(first.render(), "warming up");
        assert_eq!(second.render(), "loading...");
        assert_eq!(first.render_line(), "Python Output: warming up");
        assert_eq!(first.snapshot().phase, ViewPhase::Loading);

        release.send(()).unwrap();
        assert!(first.wait_done(WAIT));
        assert!(second.wait_done(WAIT));
        assert_eq!(first.render(), "8");
    }

    #[test]
    fn test_renders_evaluating_message_while_running() {
        let logs = LogTrailSystem::new();
        let (loader, gate) = StubLoader::gated(json!(8));
        let runtime = SharedRuntime::new(loader.clone(), logs.clone());
        let view = EvaluatorView::new(
            EvaluationRequest::new("print(3+5)").with_evaluating_message("crunching"),
            logs,
        );

        view.mount(&runtime);
        runtime.wait_settled(WAIT);
        assert_eq!(view.state(), ViewState::Evaluating);
        assert_eq!(view.render(), "crunching");
        assert!(!view.wait_done(Some(Duration::from_millis(50))));

        gate.send(()).unwrap();
        assert!(view.wait_done(WAIT));
        assert_eq!(view.render(), "8");
        assert_eq!(loader.run_count(), 1);
    }

    #[test]
    fn test_displays_engine_result() {
        let logs = LogTrailSystem::new();
        let runtime = SharedRuntime::new(StubLoader::returning(json!(8)), logs.clone());
        let view = view("print(3+5)", &logs);

        view.mount(&runtime);
        assert!(view.wait_done(WAIT));
        assert_eq!(view.state(), ViewState::Done("8".to_string()));
        assert_eq!(view.render(), "8");
        assert_eq!(
            view.snapshot(),
            ViewSnapshot {
                id: None,
                phase: ViewPhase::Done,
                display: "8".to_string()
            }
        );
        assert_eq!(logs.count_level(LogLevel::Error), 0);
    }

    #[test]
    fn test_failure_shows_fixed_message_and_logs_once() {
        let logs = LogTrailSystem::new();
        let runtime = SharedRuntime::new(
            StubLoader::failing_runs("NameError: name 'x' is not defined"),
            logs.clone(),
        );
        let view = EvaluatorView::new(EvaluationRequest::new("x").with_id("broken"), logs.clone());

        view.mount(&runtime);
        assert!(view.wait_done(WAIT));
        assert_eq!(
            view.render(),
            "Error evaluating Python code. See console for details."
        );
        assert!(!view.render().contains("NameError"));

        let errors: Vec<_> = logs
            .get_all()
            .into_iter()
            .filter(|e| e.level == LogLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("NameError"));
        assert_eq!(errors[0].source, LogSource::View("broken".to_string()));
    }

    #[test]
    fn test_views_resolve_independently() {
        let logs = LogTrailSystem::new();
        let loader = StubLoader::new(|code| match code {
            "print(3+5)" => Ok(json!(8)),
            "print('hi')" => Ok(json!("hi")),
            _ => Err(EngineError::evaluation_failed("unexpected")),
        });
        let runtime = SharedRuntime::new(loader.clone(), logs.clone());
        let sum = view("print(3+5)", &logs);
        let greeting = view("print('hi')", &logs);
        let broken = view("raise", &logs);

        sum.mount(&runtime);
        greeting.mount(&runtime);
        broken.mount(&runtime);

        for v in [&sum, &greeting, &broken] {
            assert!(v.wait_done(WAIT));
        }
        assert_eq!(sum.render(), "8");
        assert_eq!(greeting.render(), "hi");
        assert_eq!(broken.render(), EVALUATION_ERROR_MESSAGE);
        assert_eq!(loader.load_count(), 1);
        assert_eq!(loader.run_count(), 3);
    }

    #[test]
    fn test_concurrent_mounts_load_engine_once() {
        const VIEWS: usize = 12;
        let logs = LogTrailSystem::new();
        let loader = StubLoader::returning(json!(8));
        let runtime = SharedRuntime::new(loader.clone(), logs.clone());
        let barrier = Arc::new(Barrier::new(VIEWS));

        let handles: Vec<_> = (0..VIEWS)
            .map(|i| {
                let runtime = Arc::clone(&runtime);
                let barrier = Arc::clone(&barrier);
                let logs = logs.clone();
                thread::spawn(move || {
                    let view = EvaluatorView::new(EvaluationRequest::new(format!("print({i})")), logs);
                    barrier.wait();
                    view.mount(&runtime);
                    assert!(view.wait_done(WAIT));
                    view.render()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "8");
        }
        assert_eq!(loader.load_count(), 1);
        assert_eq!(loader.run_count(), VIEWS);
    }

    #[test]
    fn test_wait_done_with_huge_timeout() {
        let logs = LogTrailSystem::new();
        let runtime = SharedRuntime::new(StubLoader::returning(json!(8)), logs.clone());
        let view = view("print(3+5)", &logs);

        view.mount(&runtime);
        assert!(view.wait_done(Some(Duration::MAX)));
        assert_eq!(view.render(), "8");
    }

    #[test]
    fn test_mounting_twice_evaluates_once() {
        let logs = LogTrailSystem::new();
        let loader = StubLoader::returning(json!(8));
        let runtime = SharedRuntime::new(loader.clone(), logs.clone());
        let view = view("print(3+5)", &logs);

        assert!(!view.is_mounted());
        view.mount(&runtime);
        view.mount(&runtime);
        assert!(view.is_mounted());
        assert!(view.wait_done(WAIT));

        // a second view after settlement still sees the same engine
        let late = EvaluatorView::new(EvaluationRequest::new("print(3+5)"), logs);
        late.mount(&runtime);
        assert!(late.wait_done(WAIT));

        assert_eq!(loader.load_count(), 1);
        assert_eq!(loader.run_count(), 2);
    }

    #[test]
    fn test_unavailable_engine_releases_every_view() {
        let logs = LogTrailSystem::new();
        let loader = FailingLoader::new("pyodide.js returned 404");
        let runtime = SharedRuntime::new(loader.clone(), logs.clone());
        let views: Vec<_> = (0..3).map(|i| view(&format!("print({i})"), &logs)).collect();

        for v in &views {
            v.mount(&runtime);
        }
        for v in &views {
            assert!(v.wait_done(WAIT));
            assert_eq!(v.state(), ViewState::Unavailable);
            assert_eq!(v.render(), ENGINE_UNAVAILABLE_MESSAGE);
            assert_eq!(v.snapshot().phase, ViewPhase::Unavailable);
        }
        assert_eq!(loader.load_count(), 1);
        assert_eq!(logs.count_level(LogLevel::Error), 1);
    }

    #[test]
    fn test_request_from_toml_uses_defaults() {
        let request: EvaluationRequest = toml::from_str(r#"code = "print(3+5)""#).unwrap();
        assert_eq!(request, EvaluationRequest::new("print(3+5)"));

        let custom: EvaluationRequest = toml::from_str(
            r#"
id = "sum"
code = "1 + 1"
loading_message = "booting"
"#,
        )
        .unwrap();
        assert_eq!(custom.id.as_deref(), Some("sum"));
        assert_eq!(custom.loading_message, "booting");
        assert_eq!(custom.evaluating_message, "evaluating...");
    }
}

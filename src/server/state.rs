//! State shared between the request loop and the config watcher.

use crate::config::{PyviewConfig, ServeMode};
use crate::logging::{LogEntry, LogSource, LogTrailSystem};
use crate::runtime::{EngineLoader, EvaluatorView, SharedRuntime, ViewSnapshot};
use crate::template;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

struct PageState {
    config: PyviewConfig,
    views: Vec<Arc<EvaluatorView>>,
}

pub struct ServerState {
    mode: ServeMode,
    watch: bool,
    runtime: Arc<SharedRuntime>,
    page: Mutex<PageState>,
    generation: AtomicU64,
}

impl ServerState {
    pub fn new(
        config: PyviewConfig,
        mode: ServeMode,
        watch: bool,
        loader: Arc<dyn EngineLoader>,
        logs: LogTrailSystem,
    ) -> Self {
        let runtime = SharedRuntime::new(loader, logs);
        let views = build_views(&config, runtime.logs());

        Self {
            mode,
            watch,
            runtime,
            page: Mutex::new(PageState { config, views }),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.page
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn mode(&self) -> ServeMode {
        self.mode
    }

    pub fn is_watching(&self) -> bool {
        self.watch
    }

    pub fn runtime(&self) -> &Arc<SharedRuntime> {
        &self.runtime
    }

    pub fn logs(&self) -> &LogTrailSystem {
        self.runtime.logs()
    }

    pub fn view_count(&self) -> usize {
        self.lock().views.len()
    }

    /// Render the page. In native mode this mounts every view, so the first
    /// page request is what starts the engine load.
    pub fn page_html(&self) -> String {
        let page = self.lock();
        let reload = self.watch.then(|| self.generation());

        match self.mode {
            ServeMode::Pyodide => template::render_page(&page.config, self.mode, None, reload),
            ServeMode::Native => {
                for view in &page.views {
                    view.mount(&self.runtime);
                }
                let snapshots: Vec<ViewSnapshot> =
                    page.views.iter().map(|view| view.snapshot()).collect();
                template::render_page(&page.config, self.mode, Some(&snapshots), reload)
            }
        }
    }

    pub fn snapshots(&self) -> Vec<ViewSnapshot> {
        self.lock().views.iter().map(|view| view.snapshot()).collect()
    }

    /// Swap in a reloaded config. Views are rebuilt on the same runtime, so
    /// the engine is never loaded a second time.
    pub fn replace_config(&self, config: PyviewConfig) {
        let mut page = self.lock();

        if config.engine.interpreter != page.config.engine.interpreter
            && self.runtime.is_started()
        {
            self.logs().log(LogEntry::warn(
                LogSource::Server,
                format!(
                    "Interpreter change to '{}' takes effect after a restart",
                    config.engine.interpreter
                ),
            ));
        }

        page.views = build_views(&config, self.runtime.logs());
        page.config = config;
        drop(page);

        self.generation.fetch_add(1, Ordering::AcqRel);
        self.logs()
            .log(LogEntry::info(LogSource::Server, "Configuration reloaded"));
    }

    /// Incremented on every config reload
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

fn build_views(config: &PyviewConfig, logs: &LogTrailSystem) -> Vec<Arc<EvaluatorView>> {
    config
        .views
        .iter()
        .map(|request| Arc::new(EvaluatorView::new(request.clone(), logs.clone())))
        .collect()
}

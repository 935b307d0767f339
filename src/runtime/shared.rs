//! Process-wide handle to the lazily loaded engine.
//!
//! The first caller of [`SharedRuntime::ensure_initialization_started`] wins a
//! compare-and-swap on the `started` flag and spawns the load on a background
//! thread. Every other caller is a no-op. When the load finishes the status
//! settles to `Ready` or `Unavailable` and each registered observer runs
//! exactly once.

use super::engine::{Engine, EngineLoader};
use crate::logging::{LogEntry, LogSource, LogTrailSystem};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Load state of the shared engine. A handle exists only in `Ready`.
#[derive(Clone)]
pub enum RuntimeStatus {
    Pending,
    Ready(Arc<dyn Engine>),
    Unavailable(String),
}

impl RuntimeStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, RuntimeStatus::Pending)
    }
}

impl std::fmt::Debug for RuntimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeStatus::Pending => write!(f, "Pending"),
            RuntimeStatus::Ready(engine) => write!(f, "Ready({})", engine.name()),
            RuntimeStatus::Unavailable(reason) => write!(f, "Unavailable({reason})"),
        }
    }
}

type SettledObserver = Box<dyn FnOnce(&RuntimeStatus) + Send>;

struct Inner {
    status: RuntimeStatus,
    observers: Vec<SettledObserver>,
    /// Set once every observer registered before settlement has run
    notified: bool,
}

pub struct SharedRuntime {
    loader: Arc<dyn EngineLoader>,
    started: AtomicBool,
    inner: Mutex<Inner>,
    settled: Condvar,
    logs: LogTrailSystem,
}

impl SharedRuntime {
    pub fn new(loader: Arc<dyn EngineLoader>, logs: LogTrailSystem) -> Arc<Self> {
        Arc::new(Self {
            loader,
            started: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                status: RuntimeStatus::Pending,
                observers: Vec::new(),
                notified: false,
            }),
            settled: Condvar::new(),
            logs,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start loading the engine unless someone already did.
    ///
    /// Returns `true` only for the caller that actually started the load.
    pub fn ensure_initialization_started(self: &Arc<Self>) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.logs.log(LogEntry::debug(
            LogSource::Engine,
            format!("Loading {}", self.loader.describe()),
        ));

        let runtime = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("pyview-engine-loader".to_string())
            .spawn(move || {
                let status = runtime.load_engine();
                runtime.settle(status);
            });

        if let Err(e) = spawned {
            self.settle(RuntimeStatus::Unavailable(format!(
                "Failed to spawn loader thread: {e}"
            )));
        }

        true
    }

    fn load_engine(&self) -> RuntimeStatus {
        let loader = Arc::clone(&self.loader);
        match panic::catch_unwind(AssertUnwindSafe(move || loader.load())) {
            Ok(Ok(engine)) => {
                self.logs.log(LogEntry::info(
                    LogSource::Engine,
                    format!("Loaded {}", engine.name()),
                ));
                RuntimeStatus::Ready(engine)
            }
            Ok(Err(e)) => RuntimeStatus::Unavailable(e.to_string()),
            Err(_) => RuntimeStatus::Unavailable("Engine loader panicked".to_string()),
        }
    }

    fn settle(&self, status: RuntimeStatus) {
        if let RuntimeStatus::Unavailable(reason) = &status {
            self.logs
                .log(LogEntry::error(LogSource::Engine, reason.clone()));
        }

        let observers = {
            let mut inner = self.lock();
            inner.status = status.clone();
            std::mem::take(&mut inner.observers)
        };

        for observer in observers {
            observer(&status);
        }

        self.lock().notified = true;
        self.settled.notify_all();
    }

    /// Run `observer` once the engine settles. Runs immediately on the
    /// calling thread if it already has.
    pub fn on_settled<F>(&self, observer: F)
    where
        F: FnOnce(&RuntimeStatus) + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.status.is_settled() {
            let status = inner.status.clone();
            drop(inner);
            observer(&status);
        } else {
            inner.observers.push(Box::new(observer));
        }
    }

    /// Block until the engine settles and its observers have run, or until
    /// `timeout` elapses.
    pub fn wait_settled(&self, timeout: Option<Duration>) -> RuntimeStatus {
        // a timeout too large to represent waits forever
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut inner = self.lock();

        while !inner.notified {
            inner = match deadline {
                None => self
                    .settled
                    .wait(inner)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    self.settled
                        .wait_timeout(inner, deadline - now)
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .0
                }
            };
        }

        inner.status.clone()
    }

    pub fn status(&self) -> RuntimeStatus {
        self.lock().status.clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    #[allow(dead_code)]
    pub fn is_ready(&self) -> bool {
        matches!(self.lock().status, RuntimeStatus::Ready(_))
    }

    pub fn logs(&self) -> &LogTrailSystem {
        &self.logs
    }
}

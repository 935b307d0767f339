//! Stub engines and loaders for unit tests.

use super::engine::{Engine, EngineLoader};
use crate::error::EngineError;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

type Responder = Arc<dyn Fn(&str) -> Result<Value, EngineError> + Send + Sync>;

/// Loader whose engine answers through a closure.
pub struct StubLoader {
    responder: Responder,
    gate: Option<Arc<Mutex<Receiver<()>>>>,
    loads: AtomicUsize,
    runs: Arc<AtomicUsize>,
}

impl StubLoader {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<Value, EngineError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Arc::new(responder),
            gate: None,
            loads: AtomicUsize::new(0),
            runs: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn returning(value: Value) -> Arc<Self> {
        Self::new(move |_| Ok(value.clone()))
    }

    pub fn failing_runs(message: &'static str) -> Arc<Self> {
        Self::new(move |_| Err(EngineError::evaluation_failed(message)))
    }

    /// Every `run` blocks until a `()` is sent on the returned sender.
    pub fn gated(value: Value) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = channel();
        let loader = Arc::new(Self {
            responder: Arc::new(move |_| Ok(value.clone())),
            gate: Some(Arc::new(Mutex::new(rx))),
            loads: AtomicUsize::new(0),
            runs: Arc::new(AtomicUsize::new(0)),
        });
        (loader, tx)
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl EngineLoader for StubLoader {
    fn load(&self) -> Result<Arc<dyn Engine>, EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubEngine {
            responder: Arc::clone(&self.responder),
            gate: self.gate.clone(),
            runs: Arc::clone(&self.runs),
        }))
    }

    fn describe(&self) -> String {
        "stub".to_string()
    }
}

struct StubEngine {
    responder: Responder,
    gate: Option<Arc<Mutex<Receiver<()>>>>,
    runs: Arc<AtomicUsize>,
}

impl Engine for StubEngine {
    fn run(&self, code: &str) -> Result<Value, EngineError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _ = gate.lock().unwrap().recv();
        }
        (self.responder)(code)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Loader that blocks in `load` until released.
pub struct BlockingLoader {
    inner: Arc<StubLoader>,
    release: Mutex<Receiver<()>>,
}

impl BlockingLoader {
    pub fn new(value: Value) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = channel();
        let loader = Arc::new(Self {
            inner: StubLoader::returning(value),
            release: Mutex::new(rx),
        });
        (loader, tx)
    }

    pub fn load_count(&self) -> usize {
        self.inner.load_count()
    }
}

impl EngineLoader for BlockingLoader {
    fn load(&self) -> Result<Arc<dyn Engine>, EngineError> {
        self.release
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| EngineError::load_failed("released without a signal"))?;
        self.inner.load()
    }

    fn describe(&self) -> String {
        "blocking stub".to_string()
    }
}

pub struct FailingLoader {
    reason: String,
    loads: AtomicUsize,
}

impl FailingLoader {
    pub fn new(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            reason: reason.to_string(),
            loads: AtomicUsize::new(0),
        })
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl EngineLoader for FailingLoader {
    fn load(&self) -> Result<Arc<dyn Engine>, EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(EngineError::load_failed(self.reason.clone()))
    }

    fn describe(&self) -> String {
        "failing stub".to_string()
    }
}

pub struct PanickingLoader;

impl EngineLoader for PanickingLoader {
    fn load(&self) -> Result<Arc<dyn Engine>, EngineError> {
        panic!("loader exploded")
    }

    fn describe(&self) -> String {
        "panicking stub".to_string()
    }
}

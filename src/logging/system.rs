use super::{LogEntry, LogLevel};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

pub const MAX_LOG_ENTRIES: usize = 1000;

/// Bounded in-memory diagnostic channel shared by the runtime, the views and
/// the server. Clones share the same buffer.
#[derive(Clone)]
pub struct LogTrailSystem {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    echo: bool,
}

impl LogTrailSystem {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
            echo: false,
        }
    }

    /// Same buffer, but warnings and errors are also printed to stderr.
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn log(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Error if self.echo => crate::error_println!("{}", entry),
            LogLevel::Warn if self.echo => crate::warn_println!("{}", entry),
            _ => crate::debug_println!("{}", entry),
        }

        let mut entries = self.lock();
        entries.push_back(entry);

        if entries.len() > MAX_LOG_ENTRIES {
            entries.pop_front();
        }
    }

    #[allow(dead_code)]
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    #[allow(dead_code)]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn count_level(&self, level: LogLevel) -> usize {
        self.lock().iter().filter(|e| e.level == level).count()
    }
}

impl Default for LogTrailSystem {
    fn default() -> Self {
        Self::new()
    }
}

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

type DebounceResult = Result<Vec<DebouncedEvent>, notify::Error>;

/// Watches a single config file for changes.
///
/// The parent directory is watched rather than the file itself, so editors
/// that save by replacing the file are still picked up.
pub struct ConfigWatcher {
    file_name: OsString,
    debounced_receiver: Receiver<DebounceResult>,
    _debouncer: notify_debouncer_mini::Debouncer<RecommendedWatcher>,
}

impl ConfigWatcher {
    pub fn new(config_path: &Path) -> Result<Self, String> {
        if !config_path.is_file() {
            return Err(format!(
                "Config file does not exist: {}",
                config_path.display()
            ));
        }

        let file_name = config_path
            .file_name()
            .ok_or_else(|| format!("Invalid config path: {}", config_path.display()))?
            .to_os_string();

        let directory = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (tx, rx) = channel();

        let mut debouncer = new_debouncer(Duration::from_millis(300), tx)
            .map_err(|e| format!("Failed to create file watcher: {e}"))?;

        debouncer
            .watcher()
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(|e| format!("Failed to watch directory: {e}"))?;

        println!("🔍 Watching config: {}", config_path.display());

        Ok(Self {
            file_name,
            debounced_receiver: rx,
            _debouncer: debouncer,
        })
    }

    /// Block until the next batch of events. `None` once the watcher is gone.
    pub fn wait_for_change(&self) -> Option<DebounceResult> {
        self.debounced_receiver.recv().ok()
    }

    pub fn should_reload(&self, events: &[DebouncedEvent]) -> bool {
        events.iter().any(|event| {
            matches!(
                event.kind,
                DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
            ) && event.path.file_name() == Some(self.file_name.as_os_str())
        })
    }
}

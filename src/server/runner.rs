use super::handler::handle_request;
use super::lifecycle::{is_server_running, remove_pid_file, stop_existing_server, write_pid_file};
use super::state::ServerState;
use super::utils::{is_port_available, open_browser_when_ready};
use crate::config::{config_dir, PyviewConfig, ServeMode};
use crate::error::{Result, ServerError};
use crate::logging::LogTrailSystem;
use crate::runtime::PythonProcessLoader;
use crate::watcher::ConfigWatcher;
use crate::{debug_println, info_println, ui};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tiny_http::Server;

pub struct ServeOptions {
    pub config: PyviewConfig,
    /// File the config came from, `None` for built-in defaults
    pub config_path: Option<PathBuf>,
    pub port: u16,
    pub mode: ServeMode,
    pub watch: bool,
    pub open_browser: bool,
}

/// Serve the demo page until Ctrl+C
pub fn serve(options: ServeOptions) -> Result<()> {
    if is_server_running() {
        match stop_existing_server() {
            Ok(_) => println!("💀 Existing server stopped successfully."),
            Err(e) => eprintln!("❗ Warning when stopping existing server: {e}"),
        }
    }

    let port = options.port;
    if !is_port_available(port) {
        return Err(
            ServerError::startup_failed(port, format!("Port {port} is already in use")).into(),
        );
    }

    let watcher = match (&options.config_path, options.watch) {
        (Some(path), true) => match ConfigWatcher::new(path) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                eprintln!("❗ Failed to set up config watcher: {e}");
                None
            }
        },
        (None, true) => {
            eprintln!("❗ No config file to watch, running without watch mode");
            None
        }
        _ => None,
    };

    let mut loader = PythonProcessLoader::new(options.config.engine.interpreter.clone());
    if let Some(dir) = options.config_path.as_deref().and_then(config_dir) {
        loader = loader.with_working_dir(dir);
    }
    let engine_label = match options.mode {
        ServeMode::Pyodide => options.config.pyodide_script_url(),
        ServeMode::Native => options.config.engine.interpreter.clone(),
    };

    let state = Arc::new(ServerState::new(
        options.config,
        options.mode,
        watcher.is_some(),
        Arc::new(loader),
        LogTrailSystem::new().with_echo(),
    ));

    let server = Server::http(format!("0.0.0.0:{port}"))
        .map(Arc::new)
        .map_err(|e| ServerError::startup_failed(port, e.to_string()))?;

    write_pid_file()?;

    {
        let server = Arc::clone(&server);
        if let Err(e) = ctrlc::set_handler(move || {
            println!("\n👋 Shutting down pyview server...");
            server.unblock();
        }) {
            eprintln!("❗ Failed to install Ctrl+C handler: {e}");
        }
    }

    let config_source = options.config_path.as_ref().map(|p| p.display().to_string());
    ui::print_server_info(
        &format!("http://localhost:{port}"),
        state.mode(),
        &engine_label,
        state.view_count(),
        config_source.as_deref(),
        state.is_watching(),
    );

    if options.open_browser {
        open_browser_when_ready(port);
    }

    if let (Some(watcher), Some(path)) = (watcher, options.config_path) {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            while let Some(result) = watcher.wait_for_change() {
                match result {
                    Ok(events) if watcher.should_reload(&events) => {
                        info_println!("\n📝 Config change detected. Reloading...");
                        match PyviewConfig::load_from(&path) {
                            Ok(config) => {
                                state.replace_config(config);
                                info_println!("🔄 Triggering browser reload...");
                            }
                            Err(e) => eprintln!("❌ Keeping previous config: {e}"),
                        }
                    }
                    Ok(_) => {}
                    Err(e) => eprintln!("❗ Watch error: {e}"),
                }
            }
            debug_println!("Config watcher stopped");
        });
    }

    for request in server.incoming_requests() {
        handle_request(request, &state);
    }

    remove_pid_file();
    Ok(())
}

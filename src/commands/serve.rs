use crate::config::PyviewConfig;
use crate::config::ServeMode;
use crate::debug_println;
use crate::error::Result;
use crate::server::{self, ServeOptions};
use std::path::Path;

/// Handle serve command
pub fn handle_serve_command(
    config: Option<&Path>,
    port: Option<u16>,
    mode: Option<ServeMode>,
    watch: bool,
    no_open: bool,
) -> Result<()> {
    let (config, config_path) = PyviewConfig::load(config)?;
    debug_println!("Using config: {:?}", config_path);

    let port = port.unwrap_or(config.server.port);
    let mode = mode.unwrap_or(config.server.mode);

    server::serve(ServeOptions {
        config,
        config_path,
        port,
        mode,
        watch,
        open_browser: !no_open,
    })
}

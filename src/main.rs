mod cli;
mod commands;
mod config;
mod debug;
mod error;
mod logging;
mod runtime;
mod server;
mod template;
mod ui;
mod utils;
mod watcher;

use cli::{get_args, Commands};
use debug::enable_debug;
use std::error::Error;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("\n🔥 pyview encountered an unexpected error:");
        eprintln!("{panic_info}");
        eprintln!("\n💡 This is likely a bug. Please report it with your command,");
        eprintln!("   your pyview.toml and this error message.");
    }));

    let args = get_args();

    if args.debug {
        enable_debug();
    }

    let result = match &args.command {
        Commands::Eval {
            code,
            config,
            interpreter,
            timeout,
            json,
        } => commands::handle_eval_command(
            code,
            config.as_deref(),
            interpreter.clone(),
            *timeout,
            *json,
        ),

        Commands::Serve {
            config,
            port,
            mode,
            watch,
            no_open,
        } => commands::handle_serve_command(config.as_deref(), *port, *mode, *watch, *no_open),

        Commands::Init { path, force } => commands::handle_init_command(path, *force),

        Commands::Check { config } => commands::handle_check_command(config.as_deref()),

        Commands::Stop => commands::handle_stop_command(),
    };

    if let Err(e) = result {
        let mut error_source: &dyn Error = &e;
        eprintln!("❌ {error_source}");

        while let Some(source) = error_source.source() {
            eprintln!("   Caused by: {source}");
            error_source = source;
        }

        for suggestion in e.suggestions() {
            eprintln!("💡 {suggestion}");
        }

        std::process::exit(1);
    }
}

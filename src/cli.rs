use crate::config::ServeMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pyview - load a Python engine once, evaluate snippets in views 🐍
#[derive(Parser, Debug)]
#[command(
    name = "pyview",
    author,
    version = get_version_string(),
    about = "Load a Python engine once and evaluate snippets in views",
    long_about = "pyview embeds a Python engine behind evaluator views. The engine is loaded once, lazily, and every view evaluates its snippet on it as soon as it is ready. Serve the views as a Pyodide page or evaluate them from the terminal.",
    after_help = "Run 'pyview init' to create a pyview.toml with the demo view."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate the configured views with the local interpreter
    Eval {
        /// Snippet to evaluate instead of the configured views (repeatable)
        #[arg(short = 'c', long = "code", value_name = "CODE")]
        code: Vec<String>,

        /// Config file to read (default: ./pyview.toml, then the global config)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,

        /// Python interpreter to load
        #[arg(short = 'i', long)]
        interpreter: Option<String>,

        /// Seconds to wait for every view to finish
        #[arg(short = 't', long, default_value_t = 30)]
        timeout: u64,

        /// Print view snapshots as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the demo page
    #[command(aliases = ["run", "dev"])]
    Serve {
        /// Config file to read (default: ./pyview.toml, then the global config)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,

        /// Server port number (default: from config, 8420)
        #[arg(
            short = 'P',
            long,
            value_parser = clap::value_parser!(u16).range(1..=65535)
        )]
        port: Option<u16>,

        /// Where views evaluate (default: from config, pyodide)
        #[arg(short = 'm', long, value_enum)]
        mode: Option<ServeMode>,

        /// Reload the page when the config file changes
        #[arg(short = 'W', long)]
        watch: bool,

        /// Do not open a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Write a pyview.toml with the demo view
    Init {
        /// File to write
        #[arg(short = 'p', long, default_value = "pyview.toml", value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short = 'f', long)]
        force: bool,
    },

    /// Check the interpreter and the Pyodide CDN
    Check {
        /// Config file to read (default: ./pyview.toml, then the global config)
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,
    },

    /// Stop any running pyview server instance
    #[command(alias = "kill")]
    Stop,
}

/// Get version string
fn get_version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_args() -> Args {
    if std::env::args().any(|arg| arg == "-V" || arg == "--version") {
        print_styled_version();
        std::process::exit(0);
    }

    Args::parse()
}

/// Print styled version output
fn print_styled_version() {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");

    println!(
        "\n\x1b[1;34m╭\x1b[0m\n\
         \x1b[1;34m│\x1b[0m  🐍 \x1b[1;36m{name} v{version}\x1b[0m\n\
         \x1b[1;34m│\x1b[0m  \x1b[0;90mLoad a Python engine once, evaluate everywhere\x1b[0m\n\
         \x1b[1;34m╰\x1b[0m\n"
    );
}

mod handler;
mod lifecycle;
mod runner;
mod state;
pub mod utils;

pub use lifecycle::{is_server_running, stop_existing_server};
pub use runner::{serve, ServeOptions};

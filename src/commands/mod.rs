mod check;
mod eval;
mod init;
mod serve;
mod stop;

pub use check::handle_check_command;
pub use eval::handle_eval_command;
pub use init::handle_init_command;
pub use serve::handle_serve_command;
pub use stop::handle_stop_command;

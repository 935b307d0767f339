pub mod command;

pub use command::CommandExecutor;

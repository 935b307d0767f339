//! Configuration module for pyview

pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{
    config_dir, EngineSettings, PageSettings, PyviewConfig, ServeMode, ServerSettings,
};

use crate::config::PyviewConfig;
use crate::error::{PyviewError, Result};
use crate::ui::print_success;
use std::path::Path;

/// Handle init command
pub fn handle_init_command(path: &Path, force: bool) -> Result<()> {
    if path.is_dir() {
        return Err(PyviewError::path(format!(
            "{} is a directory, pass a file path",
            path.display()
        )));
    }

    if path.exists() && !force {
        return Err(PyviewError::path(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    PyviewConfig::default().save_to(path)?;

    print_success(
        "pyview Config Created",
        &format!("Wrote {}. Run 'pyview serve' to see it.", path.display()),
    );
    Ok(())
}

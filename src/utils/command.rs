use std::path::Path;
use std::process::{Command, Output};

/// Shared process helpers
pub struct CommandExecutor;

impl CommandExecutor {
    /// Check if a tool is installed on the system
    ///
    /// A name containing a path separator is checked on disk, anything else
    /// is looked up on `PATH`.
    pub fn is_tool_installed(tool_name: &str) -> bool {
        if tool_name.contains(std::path::MAIN_SEPARATOR) || tool_name.contains('/') {
            return Path::new(tool_name).is_file();
        }

        Command::new(if cfg!(target_os = "windows") {
            "where"
        } else {
            "which"
        })
        .arg(tool_name)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
    }

    /// Execute a command and return its captured output
    pub fn execute_command(
        command: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> std::io::Result<Output> {
        crate::debug_println!("Executing: {} {}", command, args.join(" "));

        let mut cmd = Command::new(command);
        cmd.args(args);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd.output()
    }

    /// First line printed by `<tool> --version`, from stdout or stderr
    pub fn tool_version(tool_name: &str) -> Option<String> {
        let output = Self::execute_command(tool_name, &["--version"], None).ok()?;
        if !output.status.success() {
            return None;
        }

        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };

        text.lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
    }
}

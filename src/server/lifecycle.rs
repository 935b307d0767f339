use crate::config::PID_FILE;
use crate::error::{PyviewError, Result, ServerError};
use std::path::Path;

/// Check if a pyview server is currently running
pub fn is_server_running() -> bool {
    if !Path::new(PID_FILE).exists() {
        return false;
    }

    if let Ok(pid_str) = std::fs::read_to_string(PID_FILE) {
        if let Ok(pid) = pid_str.trim().parse::<u32>() {
            let ps_command = std::process::Command::new("ps")
                .arg("-p")
                .arg(pid.to_string())
                .output();

            if let Ok(output) = ps_command {
                return output.status.success()
                    && String::from_utf8_lossy(&output.stdout).lines().count() > 1;
            }
        }
    }

    false
}

/// Record this process as the running server
pub fn write_pid_file() -> Result<()> {
    std::fs::write(PID_FILE, std::process::id().to_string()).map_err(|e| {
        PyviewError::add_context(format!("Failed to write PID to {PID_FILE}"), e)
    })
}

pub fn remove_pid_file() {
    if Path::new(PID_FILE).exists() {
        let _ = std::fs::remove_file(PID_FILE);
    }
}

/// Stop an existing pyview server if one is running
pub fn stop_existing_server() -> Result<()> {
    if !is_server_running() {
        if Path::new(PID_FILE).exists() {
            std::fs::remove_file(PID_FILE).map_err(|e| ServerError::StopFailed {
                pid: 0,
                reason: format!("Failed to remove stale PID file: {e}"),
            })?;
        }
        return Err(ServerError::NotRunning.into());
    }

    let pid_str = std::fs::read_to_string(PID_FILE).map_err(|e| ServerError::StopFailed {
        pid: 0,
        reason: format!("Failed to read PID file: {e}"),
    })?;

    let pid = pid_str
        .trim()
        .parse::<u32>()
        .map_err(|e| ServerError::StopFailed {
            pid: 0,
            reason: format!("Failed to parse PID '{}': {}", pid_str.trim(), e),
        })?;

    let kill_command = std::process::Command::new("kill")
        .arg(pid.to_string())
        .output()
        .map_err(|e| ServerError::StopFailed {
            pid,
            reason: format!("Failed to kill server process: {e}"),
        })?;

    if kill_command.status.success() {
        remove_pid_file();
        crate::success_println!("Existing pyview server terminated");
        Ok(())
    } else {
        Err(ServerError::StopFailed {
            pid,
            reason: String::from_utf8_lossy(&kill_command.stderr).to_string(),
        }
        .into())
    }
}

use crate::config::{PyviewConfig, DEMO_CODE};
use crate::error::{CommandError, Result};
use crate::runtime::{display_value, EngineLoader, PythonProcessLoader};
use crate::ui::print_check;
use anyhow::{bail, Context};
use std::path::Path;
use std::time::Duration;

const CDN_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle check command
pub fn handle_check_command(config: Option<&Path>) -> Result<()> {
    println!("\n\x1b[1;34m╭\x1b[0m");
    println!("  🩺 \x1b[1;36mpyview check\x1b[0m\n");

    let (config, source) = match PyviewConfig::load(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            print_check("Config", false, &e.to_string());
            println!("\x1b[1;34m╰\x1b[0m");
            return Err(e);
        }
    };

    let source = source
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    print_check(
        "Config",
        true,
        &format!("{source} ({} view(s))", config.views.len()),
    );

    let mut failed = 0;

    match check_interpreter(&config.engine.interpreter) {
        Ok(detail) => print_check("Interpreter", true, &detail),
        Err(e) => {
            failed += 1;
            print_check("Interpreter", false, &format!("{e:#}"));
        }
    }

    let script_url = config.pyodide_script_url();
    match check_cdn(&script_url) {
        Ok(()) => print_check("Pyodide CDN", true, &script_url),
        Err(e) => {
            failed += 1;
            print_check("Pyodide CDN", false, &format!("{e:#}"));
        }
    }

    println!("\x1b[1;34m╰\x1b[0m");

    if failed > 0 {
        return Err(CommandError::ChecksFailed { failed }.into());
    }
    Ok(())
}

/// Load the native engine and run the demo snippet on it
fn check_interpreter(interpreter: &str) -> anyhow::Result<String> {
    let engine = PythonProcessLoader::new(interpreter)
        .load()
        .with_context(|| format!("loading {interpreter}"))?;

    let value = engine
        .run(DEMO_CODE)
        .with_context(|| format!("running {DEMO_CODE}"))?;

    let output = display_value(&value);
    if output != "8" {
        bail!("{DEMO_CODE} printed '{output}', expected '8'");
    }

    Ok(engine.name().to_string())
}

/// Make sure the Pyodide loader script is reachable
fn check_cdn(url: &str) -> anyhow::Result<()> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(CDN_TIMEOUT))
        .build()
        .into();

    let response = agent
        .get(url)
        .call()
        .with_context(|| format!("fetching {url}"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{url} answered {status}");
    }
    Ok(())
}

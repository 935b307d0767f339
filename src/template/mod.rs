//! Demo page rendering.
//!
//! The page is assembled from embedded files. Placeholders look like
//! `$NAME$` and are substituted in a single pass, so text coming from the
//! config can never inject another placeholder.

use crate::config::{
    PyviewConfig, ServeMode, ENGINE_UNAVAILABLE_MESSAGE, EVALUATION_ERROR_MESSAGE, OUTPUT_LABEL,
};
use crate::runtime::{ViewPhase, ViewSnapshot};
use serde_json::json;

const INDEX_HTML: &str = include_str!("index.html");
const STYLE_CSS: &str = include_str!("style.css");
const RELOAD_JS: &str = include_str!("reload.js");
const PYODIDE_JS: &str = include_str!("pyodide.js");
const NATIVE_JS: &str = include_str!("native.js");

pub const LOGO_SVG: &str = include_str!("logo.svg");

/// Render the demo page.
///
/// In native mode `snapshots` holds the server-side view states; in pyodide
/// mode every widget starts on its loading message. `reload` is the current
/// reload generation when the server is watching the config.
pub fn render_page(
    config: &PyviewConfig,
    mode: ServeMode,
    snapshots: Option<&[ViewSnapshot]>,
    reload: Option<u64>,
) -> String {
    let engine_script = match mode {
        ServeMode::Pyodide => format!(
            "  <script src=\"{}\"></script>",
            escape_html(&config.pyodide_script_url())
        ),
        ServeMode::Native => String::new(),
    };

    let script = match mode {
        ServeMode::Pyodide => format!("{RELOAD_JS}\n{PYODIDE_JS}"),
        ServeMode::Native => format!("{RELOAD_JS}\n{NATIVE_JS}"),
    };

    let title = escape_html(&config.page.title);
    let heading = escape_html(&config.page.heading);
    let link_url = escape_html(&config.page.link_url);
    let link_text = escape_html(&config.page.link_text);
    let views = render_views(config, snapshots);
    let config_json = page_config_json(config, reload);

    fill(
        INDEX_HTML,
        &[
            ("TITLE", title.as_str()),
            ("STYLE", STYLE_CSS),
            ("ENGINE_SCRIPT", engine_script.as_str()),
            ("HEADING", heading.as_str()),
            ("LINK_URL", link_url.as_str()),
            ("LINK_TEXT", link_text.as_str()),
            ("VIEWS", views.as_str()),
            ("CONFIG_JSON", config_json.as_str()),
            ("SCRIPT", script.as_str()),
        ],
    )
}

fn render_views(config: &PyviewConfig, snapshots: Option<&[ViewSnapshot]>) -> String {
    config
        .views
        .iter()
        .enumerate()
        .map(|(index, view)| {
            let (phase, display) = match snapshots.and_then(|s| s.get(index)) {
                Some(snapshot) => (snapshot.phase, snapshot.display.clone()),
                None => (ViewPhase::Loading, view.loading_message.clone()),
            };

            let id_attr = view
                .id
                .as_ref()
                .map(|id| format!(" id=\"{}\"", escape_html(id)))
                .unwrap_or_default();

            format!(
                "      <div class=\"pyview-output\" data-view=\"{index}\" data-phase=\"{}\"{id_attr}>{OUTPUT_LABEL}: <span class=\"pyview-display\">{}</span></div>",
                phase.as_str(),
                escape_html(&display)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings the page script reads from `#pyview-config`.
fn page_config_json(config: &PyviewConfig, reload: Option<u64>) -> String {
    let value = json!({
        "indexURL": config.engine.index_url,
        "watch": reload.is_some(),
        "generation": reload.unwrap_or(0),
        "errorMessage": EVALUATION_ERROR_MESSAGE,
        "unavailableMessage": ENGINE_UNAVAILABLE_MESSAGE,
        "views": config.views,
    });

    // keep `</script>` inside a snippet from closing the element
    value.to_string().replace("</", "<\\/")
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replace every known `$NAME$` in `template`; unknown ones are left alone.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let substitution = after.find('$').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });

        match substitution {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

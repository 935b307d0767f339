use super::state::ServerState;
use super::utils::{content_type_header, request_path};
use crate::debug_println;
use crate::template::LOGO_SVG;
use tiny_http::{Method, Request, Response};

const RECENT_LOG_LIMIT: usize = 100;

/// Response produced by [`route`], before it is written to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn ok(content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    fn json<T: serde::Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::ok("application/json", body),
            Err(e) => Self::text(500, format!("Failed to encode response: {e}")),
        }
    }
}

/// Map a request to its reply
pub fn route(state: &ServerState, method: &Method, url: &str) -> Reply {
    if !matches!(method, Method::Get | Method::Head) {
        return Reply::text(405, "405 Method Not Allowed");
    }

    match request_path(url) {
        "/" | "/index.html" => Reply::ok("text/html; charset=utf-8", state.page_html()),
        "/api/views" => Reply::json(&state.snapshots()),
        "/api/logs" => Reply::json(&state.logs().get_recent(RECENT_LOG_LIMIT)),
        "/assets/logo.svg" => Reply::ok("image/svg+xml", LOGO_SVG),
        "/reload" => reload_reply(state, url),
        _ => Reply::text(404, "404 Not Found"),
    }
}

fn reload_reply(state: &ServerState, url: &str) -> Reply {
    if !state.is_watching() {
        return Reply::text(200, "not-watching");
    }

    let since = url
        .split_once('?')
        .map(|(_, query)| query)
        .into_iter()
        .flat_map(|query| query.split('&'))
        .find_map(|pair| pair.strip_prefix("since="))
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(0);

    if state.generation() > since {
        Reply::text(200, "reload")
    } else {
        Reply::text(200, "no-reload")
    }
}

/// Handle an incoming HTTP request
pub fn handle_request(request: Request, state: &ServerState) {
    let url = request.url().to_string();
    debug_println!("{} {}", request.method(), url);

    let reply = route(state, request.method(), &url);
    if reply.status >= 400 {
        println!("📝 {} {url}", reply.status);
    }

    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Some(header) = content_type_header(reply.content_type) {
        response.add_header(header);
    }

    if let Err(e) = request.respond(response) {
        eprintln!("❗ Error sending response for {url}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PyviewConfig, ServeMode};
    use crate::logging::{LogEntry, LogSource, LogTrailSystem};
    use crate::runtime::testing::StubLoader;

    fn state(mode: ServeMode, watch: bool) -> ServerState {
        ServerState::new(
            PyviewConfig::default(),
            mode,
            watch,
            StubLoader::returning(serde_json::json!("8")),
            LogTrailSystem::new(),
        )
    }

    #[test]
    fn test_index_page() {
        let state = state(ServeMode::Pyodide, false);
        let reply = route(&state, &Method::Get, "/");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert!(reply.body.contains("Python Output: "));

        let reply = route(&state, &Method::Get, "/index.html?x=1");
        assert_eq!(reply.status, 200);
    }

    #[test]
    fn test_views_api_before_mount() {
        let state = state(ServeMode::Native, false);
        let reply = route(&state, &Method::Get, "/api/views");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/json");

        let snapshots: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(snapshots[0]["phase"], "loading");
        assert_eq!(snapshots[0]["display"], "loading...");
    }

    #[test]
    fn test_logs_api() {
        let state = state(ServeMode::Native, false);
        state
            .logs()
            .log(LogEntry::error(LogSource::Engine, "engine failed"));

        let reply = route(&state, &Method::Get, "/api/logs");
        let entries: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(entries[0]["level"], "error");
        assert_eq!(entries[0]["message"], "engine failed");
    }

    #[test]
    fn test_reload_endpoint() {
        let idle = state(ServeMode::Pyodide, false);
        assert_eq!(route(&idle, &Method::Get, "/reload").body, "not-watching");

        let watching = state(ServeMode::Pyodide, true);
        assert_eq!(
            route(&watching, &Method::Get, "/reload?since=0").body,
            "no-reload"
        );

        watching.replace_config(PyviewConfig::default());
        assert_eq!(
            route(&watching, &Method::Get, "/reload?since=0").body,
            "reload"
        );
        assert_eq!(
            route(&watching, &Method::Get, "/reload?since=1").body,
            "no-reload"
        );
    }

    #[test]
    fn test_logo_and_unknown_paths() {
        let state = state(ServeMode::Pyodide, false);

        let logo = route(&state, &Method::Get, "/assets/logo.svg");
        assert_eq!(logo.status, 200);
        assert_eq!(logo.content_type, "image/svg+xml");

        assert_eq!(route(&state, &Method::Get, "/missing.js").status, 404);
        assert_eq!(route(&state, &Method::Post, "/").status, 405);
    }
}

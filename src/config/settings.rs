use super::constants::*;
use crate::error::{ConfigError, ConfigResult, PyviewError, Result};
use crate::runtime::EvaluationRequest;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static VIEW_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid view id pattern"));

/// Where the widgets evaluate when served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// In the browser, on Pyodide loaded from the CDN
    #[default]
    Pyodide,
    /// On the server, on the local Python interpreter
    Native,
}

impl std::fmt::Display for ServeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeMode::Pyodide => write!(f, "pyodide"),
            ServeMode::Native => write!(f, "native"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub title: String,
    pub heading: String,
    pub link_text: String,
    pub link_url: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            title: "pyview".to_string(),
            heading: format!("Edit {CONFIG_FILE_NAME} and save to reload."),
            link_text: "Learn Pyodide".to_string(),
            link_url: "https://pyodide.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory the browser loads `pyodide.js` from
    pub index_url: String,
    /// Interpreter for the native engine
    pub interpreter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub mode: ServeMode,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: ServeMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyviewConfig {
    pub page: PageSettings,
    pub engine: EngineSettings,
    pub server: ServerSettings,
    pub views: Vec<EvaluationRequest>,
}

impl Default for PyviewConfig {
    fn default() -> Self {
        Self {
            page: PageSettings::default(),
            engine: EngineSettings::default(),
            server: ServerSettings::default(),
            views: vec![EvaluationRequest::new(DEMO_CODE)],
        }
    }
}

impl PyviewConfig {
    /// Global config files in lookup order: `$PYVIEW_CONFIG_PATH/config.toml`,
    /// then `~/.pyview/config.toml`.
    pub fn global_candidates(env_dir: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
        env_dir
            .map(|dir| dir.join("config.toml"))
            .into_iter()
            .chain(home.map(|home| home.join(".pyview").join("config.toml")))
            .collect()
    }

    /// Pick the config file to use: the explicit one, then `./pyview.toml`,
    /// then the global one. `None` means built-in defaults.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        let env_dir = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::global_candidates(env_dir, dirs::home_dir())
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Load the resolved config, returning the file it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match Self::resolve_path(explicit) {
            Some(path) => {
                let config = Self::load_from(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PyviewError::path(format!(
                "Configuration file not found: {}. Run 'pyview init' to create it.",
                path.display()
            )));
        }

        if path.is_dir() {
            return Err(PyviewError::path(format!(
                "Config path is a directory, not a file: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PyviewError::add_context(format!("Failed to read {}", path.display()), e)
        })?;

        Ok(Self::parse(&content, path)?)
    }

    pub fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        config.validate()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
        })
    }

    /// Check every field and normalize the index URL to end with `/`.
    pub fn validate(mut self) -> ConfigResult<Self> {
        let url = self.engine.index_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid_value(
                "engine.index_url",
                format!("expected an http(s) URL, got '{url}'"),
            ));
        }
        self.engine.index_url = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{url}/")
        };

        if self.engine.interpreter.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "engine.interpreter",
                "must not be empty",
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::invalid_value("server.port", "must not be 0"));
        }

        if self.views.is_empty() {
            return Err(ConfigError::NoViews);
        }

        let mut seen = HashSet::new();
        for (index, view) in self.views.iter().enumerate() {
            if view.code.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("views[{index}].code"),
                    "must not be empty",
                ));
            }

            if let Some(id) = &view.id {
                if !VIEW_ID.is_match(id) {
                    return Err(ConfigError::invalid_value(
                        format!("views[{index}].id"),
                        format!("'{id}' is not a valid DOM id"),
                    ));
                }
                if !seen.insert(id.clone()) {
                    return Err(ConfigError::DuplicateViewId { id: id.clone() });
                }
            }
        }

        Ok(self)
    }

    /// Full URL of the Pyodide loader script
    pub fn pyodide_script_url(&self) -> String {
        format!("{}{}", self.engine.index_url, PYODIDE_SCRIPT)
    }
}

/// Directory snippets run in: the one holding the config file
pub fn config_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(content: &str) -> ConfigResult<PyviewConfig> {
        PyviewConfig::parse(content, Path::new("pyview.toml"))
    }

    #[test]
    fn test_defaults_carry_demo_view() {
        let config = PyviewConfig::default();
        assert_eq!(config.views.len(), 1);
        assert_eq!(config.views[0].code, "print(3+5)");
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.server.mode, ServeMode::Pyodide);
        assert_eq!(
            config.pyodide_script_url(),
            "https://cdn.jsdelivr.net/pyodide/dev/full/pyodide.js"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config = parse(
            r#"
[server]
mode = "native"

[engine]
index_url = "https://example.com/pyodide/v0.26.0/full"
"#,
        )
        .unwrap();

        assert_eq!(config.server.mode, ServeMode::Native);
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.engine.interpreter, "python3");
        assert_eq!(
            config.engine.index_url,
            "https://example.com/pyodide/v0.26.0/full/"
        );
        assert_eq!(config.views, PyviewConfig::default().views);
    }

    #[test]
    fn test_views_table() {
        let config = parse(
            r#"
[[views]]
id = "sum"
code = "print(3+5)"

[[views]]
code = "print('hi')"
evaluating_message = "thinking..."
"#,
        )
        .unwrap();

        assert_eq!(config.views.len(), 2);
        assert_eq!(config.views[0].id.as_deref(), Some("sum"));
        assert_eq!(config.views[1].id, None);
        assert_eq!(config.views[1].evaluating_message, "thinking...");
        assert_eq!(config.views[1].loading_message, "loading...");
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(parse("views = []"), Err(ConfigError::NoViews)));

        assert!(matches!(
            parse("[[views]]\ncode = \"  \""),
            Err(ConfigError::InvalidValue { field, .. }) if field == "views[0].code"
        ));

        assert!(matches!(
            parse("[[views]]\nid = \"1st\"\ncode = \"1\""),
            Err(ConfigError::InvalidValue { field, .. }) if field == "views[0].id"
        ));

        assert!(matches!(
            parse("[[views]]\nid = \"a\"\ncode = \"1\"\n[[views]]\nid = \"a\"\ncode = \"2\""),
            Err(ConfigError::DuplicateViewId { id }) if id == "a"
        ));

        assert!(matches!(
            parse("[engine]\nindex_url = \"ftp://cdn\""),
            Err(ConfigError::InvalidValue { field, .. }) if field == "engine.index_url"
        ));

        assert!(matches!(
            parse("[server]\nport = 0"),
            Err(ConfigError::InvalidValue { field, .. }) if field == "server.port"
        ));

        assert!(matches!(parse("views = 3"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pyview.toml");

        let mut config = PyviewConfig::default();
        config.views.push(
            EvaluationRequest::new("print('second')")
                .with_id("second")
                .with_loading_message("please wait"),
        );
        config.save_to(&path).unwrap();

        let loaded = PyviewConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let (explicit, source) = PyviewConfig::load(Some(&path)).unwrap();
        assert_eq!(explicit, config);
        assert_eq!(source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_config_dir() {
        assert_eq!(config_dir(Path::new("pyview.toml")), None);
        assert_eq!(
            config_dir(Path::new("demo/pyview.toml")),
            Some(Path::new("demo"))
        );
    }

    #[test]
    fn test_global_candidates_fall_through_to_home() {
        let candidates = PyviewConfig::global_candidates(
            Some(PathBuf::from("/etc/pyview")),
            Some(PathBuf::from("/home/ada")),
        );
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/etc/pyview/config.toml"),
                PathBuf::from("/home/ada/.pyview/config.toml"),
            ]
        );

        let home_only = PyviewConfig::global_candidates(None, Some(PathBuf::from("/home/ada")));
        assert_eq!(home_only, vec![PathBuf::from("/home/ada/.pyview/config.toml")]);
        assert!(PyviewConfig::global_candidates(None, None).is_empty());
    }

    #[test]
    fn test_missing_or_directory_path() {
        let dir = tempdir().unwrap();
        assert!(PyviewConfig::load_from(&dir.path().join("absent.toml")).is_err());
        assert!(PyviewConfig::load_from(dir.path()).is_err());
    }
}

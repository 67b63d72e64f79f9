//! Runtime configuration: optional YAML file, then environment overrides.
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub mod constants;

use constants::{
    CONFIG_FILE, DEFAULT_ACTIONS_PATH, DEFAULT_BASE_URL, DEFAULT_FALLBACK_DELAY_MS, DEFAULT_FILES_PATH,
    DEFAULT_MAX_INPUT_LINES, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STOP_PATH,
    DEFAULT_STREAM_IDLE_TIMEOUT_SECS, DEFAULT_STREAM_PATH, ENV_BASE_URL, ENV_MODEL,
};

#[derive(Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read
    Io(String),
    /// Config file is not valid YAML for `Config`
    Yaml(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Yaml(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub files_path: String,
    pub actions_path: String,
    pub stream_path: String,
    pub stop_path: String,
    pub default_model: String,
    pub fallback_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Longest silence tolerated on an open chat stream
    pub stream_idle_timeout_secs: u64,
    pub max_input_lines: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            files_path: DEFAULT_FILES_PATH.to_string(),
            actions_path: DEFAULT_ACTIONS_PATH.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            stop_path: DEFAULT_STOP_PATH.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            stream_idle_timeout_secs: DEFAULT_STREAM_IDLE_TIMEOUT_SECS,
            max_input_lines: DEFAULT_MAX_INPUT_LINES,
        }
    }
}

impl Config {
    /// Load `.hyperhint/config.yaml` if present, then apply env overrides.
    /// A broken config file is logged and replaced by defaults.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path).unwrap_or_else(|e| {
                log::warn!("{} ({}), using defaults", e, path.display());
                Self::default()
            })
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Apply `HYPERHINT_BASE_URL` / `HYPERHINT_MODEL`, honouring a `.env` file.
    pub fn apply_env_overrides(&mut self) {
        dotenvy::dotenv().ok();
        self.apply_overrides(std::env::var(ENV_BASE_URL).ok(), std::env::var(ENV_MODEL).ok());
    }

    fn apply_overrides(&mut self, base_url: Option<String>, model: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.default_model = model.trim().to_string();
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn files_url(&self) -> String {
        self.endpoint(&self.files_path)
    }

    pub fn actions_url(&self) -> String {
        self.endpoint(&self.actions_path)
    }

    pub fn stream_url(&self) -> String {
        self.endpoint(&self.stream_path)
    }

    pub fn stop_url(&self) -> String {
        self.endpoint(&self.stop_path)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_build_endpoint_urls() {
        let c = Config::default();
        assert_eq!(c.files_url(), "http://localhost:8000/api/files");
        assert_eq!(c.actions_url(), "http://localhost:8000/api/actions");
        assert_eq!(c.stream_url(), "http://localhost:8000/api/chat/stream");
        assert_eq!(c.stop_url(), "http://localhost:8000/api/chat/stop");
    }

    #[test]
    fn trailing_slash_in_base_url() {
        let c = Config { base_url: "http://h:1/".into(), ..Config::default() };
        assert_eq!(c.files_url(), "http://h:1/files");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let c = Config::from_yaml("base_url: http://example.test\nfallback_delay_ms: 50\n").unwrap();
        assert_eq!(c.base_url, "http://example.test");
        assert_eq!(c.fallback_delay(), Duration::from_millis(50));
        assert_eq!(c.default_model, DEFAULT_MODEL);
        assert_eq!(c.stream_idle_timeout(), Duration::from_secs(DEFAULT_STREAM_IDLE_TIMEOUT_SECS));
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn bad_yaml_is_an_error() {
        let err = Config::from_yaml("fallback_delay_ms: soon").unwrap_err();
        assert!(err.to_string().starts_with("Config parse error:"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model: llama3\nmax_input_lines: 4").unwrap();
        let c = Config::load_from(file.path()).unwrap();
        assert_eq!(c.default_model, "llama3");
        assert_eq!(c.max_input_lines, 4);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let mut c = Config::default();
        c.apply_overrides(Some("  ".into()), Some(" gpt-4o ".into()));
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.default_model, "gpt-4o");
    }
}

//! Configuration management for relay.
//!
//! Parses `relay.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.email`
//! - `confluence.api_token`
//! - `confluence.bearer_token`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override section heading level.
    pub target_level: Option<u8>,
    /// Override extraction mode.
    pub mode: Option<ExtractMode>,
    /// Override chunk size limit.
    pub max_chunk_chars: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "relay.toml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default heading level at which pages are split into sections.
const DEFAULT_TARGET_LEVEL: u8 = 2;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection (optional section).
    pub confluence: Option<ConfluenceConfig>,
    /// Section extraction settings.
    pub extract: ExtractConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence REST API generation used for page fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// `/rest/api/content` endpoints (Server, Data Center and Cloud).
    #[default]
    V1,
    /// `/api/v2/pages` endpoints (Cloud only).
    V2,
}

/// Confluence connection configuration.
///
/// Either `email` + `api_token` (Cloud basic auth) or `bearer_token`
/// (personal access token) must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence base URL, including `/wiki` on Cloud.
    pub base_url: String,
    /// Account email for basic auth.
    #[serde(default)]
    pub email: Option<String>,
    /// API token for basic auth.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Personal access token sent as `Bearer`.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// API generation for page fetches.
    #[serde(default)]
    pub api_version: ApiVersion,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ConfluenceConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;

        let has_bearer = self.bearer_token.as_deref().is_some_and(|t| !t.is_empty());
        if !has_bearer {
            let email = self.email.as_deref().unwrap_or_default();
            let token = self.api_token.as_deref().unwrap_or_default();
            if email.is_empty() || token.is_empty() {
                return Err(ConfigError::Validation(
                    "confluence requires bearer_token or both email and api_token".to_owned(),
                ));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Output flavor of extracted sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Plain text from a direct walk of the storage tree.
    #[default]
    Text,
    /// Markdown conversion split on ATX headings.
    Markdown,
}

impl std::str::FromStr for ExtractMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(ConfigError::Validation(format!(
                "unknown extract mode '{other}' (expected text or markdown)"
            ))),
        }
    }
}

/// Section extraction configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Deepest heading level that starts a new section.
    pub target_level: u8,
    /// Output flavor.
    pub mode: ExtractMode,
    /// Split sections longer than this many characters (0 disables).
    pub max_chunk_chars: Option<usize>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            target_level: DEFAULT_TARGET_LEVEL,
            mode: ExtractMode::Text,
            max_chunk_chars: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `relay.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// A base URL override needs a `[confluence]` section to attach to,
    /// since credentials only come from the config file.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(base_url) = &settings.base_url {
            let confluence = self.confluence.as_mut().ok_or_else(|| {
                ConfigError::Validation(
                    "--base-url requires a [confluence] section with credentials in relay.toml"
                        .into(),
                )
            })?;
            confluence.base_url.clone_from(base_url);
        }
        if let Some(level) = settings.target_level {
            self.extract.target_level = level;
        }
        if let Some(mode) = settings.mode {
            self.extract.mode = mode;
        }
        if let Some(max) = settings.max_chunk_chars {
            self.extract.max_chunk_chars = Some(max);
        }
        Ok(())
    }

    /// Get validated Confluence configuration.
    ///
    /// Use this instead of accessing the `confluence` field directly when
    /// the command talks to Confluence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The `[confluence]` section is validated lazily by
    /// [`Config::require_confluence`], so extraction of local files works
    /// without credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.extract.target_level;
        if !(1..=6).contains(&level) {
            return Err(ConfigError::Validation(format!(
                "extract.target_level must be between 1 and 6, got {level}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            expand::expand_opt(&mut confluence.email, "confluence.email")?;
            expand::expand_opt(&mut confluence.api_token, "confluence.api_token")?;
            expand::expand_opt(&mut confluence.bearer_token, "confluence.bearer_token")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Create a valid Confluence config for testing.
    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://example.atlassian.net/wiki".to_owned(),
            email: Some("bot@example.com".to_owned()),
            api_token: Some("token".to_owned()),
            bearer_token: None,
            api_version: ApiVersion::V1,
            timeout_secs: 30,
        }
    }

    fn assert_validation_error(result: Result<(), ConfigError>, expected: &str) {
        let err = result.expect_err("Expected validation to fail");
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        assert!(
            msg.contains(expected),
            "Expected error to contain '{expected}', got: {msg}"
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.confluence.is_none());
        assert_eq!(config.extract.target_level, 2);
        assert_eq!(config.extract.mode, ExtractMode::Text);
        assert_eq!(config.extract.max_chunk_chars, None);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.extract.target_level, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[confluence]
base_url = "https://example.atlassian.net/wiki"
email = "bot@example.com"
api_token = "abc"
api_version = "v2"
timeout_secs = 10

[extract]
target_level = 3
mode = "markdown"
max_chunk_chars = 1500
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.as_ref().unwrap();
        assert_eq!(confluence.base_url, "https://example.atlassian.net/wiki");
        assert_eq!(confluence.email.as_deref(), Some("bot@example.com"));
        assert_eq!(confluence.api_version, ApiVersion::V2);
        assert_eq!(confluence.timeout_secs, 10);
        assert_eq!(config.extract.target_level, 3);
        assert_eq!(config.extract.mode, ExtractMode::Markdown);
        assert_eq!(config.extract.max_chunk_chars, Some(1500));
    }

    #[test]
    fn test_parse_confluence_defaults() {
        let toml = r#"
[confluence]
base_url = "https://confluence.example.com"
bearer_token = "pat"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.api_version, ApiVersion::V1);
        assert_eq!(confluence.timeout_secs, 30);
        assert!(confluence.validate().is_ok());
    }

    #[test]
    fn test_extract_mode_from_str() {
        assert_eq!("Markdown".parse::<ExtractMode>().unwrap(), ExtractMode::Markdown);
        assert_eq!("md".parse::<ExtractMode>().unwrap(), ExtractMode::Markdown);
        assert_eq!("text".parse::<ExtractMode>().unwrap(), ExtractMode::Text);
        assert!("html".parse::<ExtractMode>().is_err());
    }

    #[test]
    fn test_validate_target_level_out_of_range() {
        let mut config = Config::default();
        config.extract.target_level = 0;
        assert_validation_error(config.validate(), "target_level");

        config.extract.target_level = 7;
        assert_validation_error(config.validate(), "target_level");
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_invalid_url() {
        let mut config = valid_confluence_config();
        config.base_url = "example.atlassian.net".to_owned();
        assert_validation_error(config.validate(), "http");
    }

    #[test]
    fn test_confluence_config_validate_missing_credentials() {
        let mut config = valid_confluence_config();
        config.api_token = Some(String::new());
        assert_validation_error(config.validate(), "bearer_token");
    }

    #[test]
    fn test_confluence_config_validate_zero_timeout() {
        let mut config = valid_confluence_config();
        config.timeout_secs = 0;
        assert_validation_error(config.validate(), "timeout_secs");
    }

    #[test]
    fn test_require_confluence_missing_section() {
        let config = Config::default();
        let err = config.require_confluence().unwrap_err();
        assert!(err.to_string().contains("[confluence]"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config {
            confluence: Some(valid_confluence_config()),
            ..Default::default()
        };
        let settings = CliSettings {
            base_url: Some("https://other.example.com".to_owned()),
            target_level: Some(1),
            mode: Some(ExtractMode::Markdown),
            max_chunk_chars: Some(800),
        };

        config.apply_cli_settings(&settings).unwrap();

        assert_eq!(
            config.confluence.unwrap().base_url,
            "https://other.example.com"
        );
        assert_eq!(config.extract.target_level, 1);
        assert_eq!(config.extract.mode, ExtractMode::Markdown);
        assert_eq!(config.extract.max_chunk_chars, Some(800));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default()).unwrap();
        assert_eq!(config.extract.target_level, 2);
        assert_eq!(config.extract.mode, ExtractMode::Text);
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("RELAY_TEST_CONFLUENCE_URL", "https://wiki.test.com");
            std::env::set_var("RELAY_TEST_API_TOKEN", "secret-token");
        }

        let toml = r#"
[confluence]
base_url = "${RELAY_TEST_CONFLUENCE_URL}"
email = "${RELAY_TEST_EMAIL:-bot@test.com}"
api_token = "${RELAY_TEST_API_TOKEN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.base_url, "https://wiki.test.com");
        assert_eq!(confluence.email.as_deref(), Some("bot@test.com"));
        assert_eq!(confluence.api_token.as_deref(), Some("secret-token"));

        unsafe {
            std::env::remove_var("RELAY_TEST_CONFLUENCE_URL");
            std::env::remove_var("RELAY_TEST_API_TOKEN");
        }
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extract]\ntarget_level = 3").unwrap();

        let config = Config::load(Some(file.path()), None).unwrap();

        assert_eq!(config.extract.target_level, 3);
        assert_eq!(config.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_missing_path() {
        let result = Config::load(Some(Path::new("/nonexistent/relay.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_invalid_cli_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extract]\nmode = \"text\"").unwrap();
        let settings = CliSettings {
            target_level: Some(9),
            ..Default::default()
        };

        let result = Config::load(Some(file.path()), Some(&settings));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_base_url_without_confluence_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extract]\ntarget_level = 2").unwrap();
        let settings = CliSettings {
            base_url: Some("https://other.example.com".to_owned()),
            ..Default::default()
        };

        let err = Config::load(Some(file.path()), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("--base-url"));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("docs").join("guides");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(CONFIG_FILENAME), "[extract]\n").unwrap();

        let found = Config::discover_config_from(&nested);

        assert_eq!(found, Some(root.path().join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("docs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(CONFIG_FILENAME), "[extract]\n").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "[extract]\n").unwrap();

        let found = Config::discover_config_from(&nested);

        assert_eq!(found, Some(nested.join(CONFIG_FILENAME)));
    }
}

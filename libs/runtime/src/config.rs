use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment prefix for layered overrides, e.g. `SHARE_LINKS__API__BASE_URL`.
pub const ENV_PREFIX: &str = "SHARE_LINKS__";

const REDACTED: &str = "***";

/// Application configuration: where the API lives and how to log.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL the API paths are joined onto, e.g. `https://host/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Section {
    #[serde(default = "default_console_level")]
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/share-links.log", empty = no file
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>, // How many rotated files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_console_level() -> String {
    "warn".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_section() -> Section {
    Section {
        console_level: default_console_level(),
        file: String::new(),
        file_level: "debug".to_string(),
        max_backups: Some(3),
        max_size_mb: Some(100),
    }
}

/// Create a default logging configuration: warnings to the console, no file.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert("default".to_string(), default_section());
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        Self::extract(Some(config_path.as_ref()))
    }

    /// Load configuration from file, or from defaults and environment when no file is given.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Self::extract(None),
        }
    }

    fn extract(config_path: Option<&Path>) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Start from a base where logging is None, so it stays None unless
        // explicitly provided by YAML/ENV.
        let base = AppConfig {
            api: ApiConfig::default(),
            logging: None,
        };

        let mut figment = Figment::new().merge(Serialized::defaults(base));
        if let Some(path) = config_path {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        // Example: SHARE_LINKS__API__BASE_URL=https://host/api maps to api.base_url
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())
    }

    /// Serialize configuration to YAML, with the API token redacted.
    pub fn to_yaml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.api.token.is_some() {
            shown.api.token = Some(REDACTED.to_string());
        }
        serde_yaml::to_string(&shown).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(base_url) = &args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(token) = &args.token {
            self.api.token = Some(token.clone());
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        let section = logging
            .entry("default".to_string())
            .or_insert_with(default_section);
        match args.verbose {
            0 => {} // keep
            1 => section.console_level = "debug".to_string(),
            _ => section.console_level = "trace".to_string(),
        }
    }

    /// Validate the API section and return the parsed base URL.
    pub fn api_base_url(&self) -> Result<Url> {
        let raw = self.api.base_url.trim();
        if raw.is_empty() {
            bail!("api.base_url is not configured");
        }
        let url = Url::parse(raw).with_context(|| format!("Invalid api.base_url '{raw}'"))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => bail!("Unsupported api.base_url scheme '{other}' (expected http or https)"),
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8080/api");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.api.connect_timeout, Duration::from_secs(10));

        let logging = config.logging.as_ref().unwrap();
        let default_section = &logging["default"];
        assert_eq!(default_section.console_level, "warn");
        assert!(default_section.file.is_empty());
    }

    // Loading reads SHARE_LINKS__* variables, so every test that loads runs
    // inside a figment Jail to serialize access to the environment.
    #[test]
    fn test_load_layered_from_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cfg.yaml",
                r#"
api:
  base_url: "https://scheduler.example.com/api"
  token: "abc123"
  timeout: "5s"
  connect_timeout: "500ms"

logging:
  default:
    console_level: debug
    file: "logs/default.log"
  share_links:
    console_level: trace
"#,
            )?;

            let config = AppConfig::load_layered("cfg.yaml").map_err(|e| e.to_string())?;

            assert_eq!(config.api.base_url, "https://scheduler.example.com/api");
            assert_eq!(config.api.token.as_deref(), Some("abc123"));
            assert_eq!(config.api.timeout, Duration::from_secs(5));
            assert_eq!(config.api.connect_timeout, Duration::from_millis(500));

            let logging = config.logging.as_ref().unwrap();
            assert_eq!(logging["default"].console_level, "debug");
            assert_eq!(logging["default"].file, "logs/default.log");
            assert_eq!(logging["share_links"].console_level, "trace");
            assert!(logging["share_links"].file.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_partial_yaml_keeps_api_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("cfg.yaml", "api:\n  base_url: \"http://localhost:3000\"\n")?;

            let config = AppConfig::load_layered("cfg.yaml").map_err(|e| e.to_string())?;

            assert_eq!(config.api.base_url, "http://localhost:3000");
            assert_eq!(config.api.timeout, Duration::from_secs(30));
            assert!(config.logging.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("cfg.yaml", "api:\n  base_uri: \"http://localhost\"\n")?;
            assert!(AppConfig::load_layered("cfg.yaml").is_err());
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = AppConfig::load_or_default(None::<&str>).map_err(|e| e.to_string())?;
            assert_eq!(config.api.base_url, "http://127.0.0.1:8080/api");
            assert!(config.logging.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cfg.yaml",
                "api:\n  base_url: \"http://from-yaml\"\n  timeout: \"10s\"\n",
            )?;
            jail.set_env("SHARE_LINKS__API__BASE_URL", "http://from-env/api");
            jail.set_env("SHARE_LINKS__API__TOKEN", "env-token");

            let config = AppConfig::load_layered("cfg.yaml").map_err(|e| e.to_string())?;

            assert_eq!(config.api.base_url, "http://from-env/api");
            assert_eq!(config.api.token.as_deref(), Some("env-token"));
            assert_eq!(config.api.timeout, Duration::from_secs(10));
            Ok(())
        });
    }

    #[test]
    fn test_apply_cli_overrides() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            base_url: Some("https://override.example.com".to_string()),
            token: Some("cli-token".to_string()),
            verbose: 2,
            ..Default::default()
        };

        config.apply_cli_overrides(&args);

        assert_eq!(config.api.base_url, "https://override.example.com");
        assert_eq!(config.api.token.as_deref(), Some("cli-token"));
        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "trace");
    }

    #[test]
    fn test_verbose_creates_default_section_when_missing() {
        let mut config = AppConfig {
            api: ApiConfig::default(),
            logging: Some(HashMap::new()),
        };
        let args = CliArgs {
            verbose: 1,
            ..Default::default()
        };

        config.apply_cli_overrides(&args);

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "debug");
    }

    #[test]
    fn test_to_yaml_redacts_token() {
        let mut config = AppConfig::default();
        config.api.token = Some("super-secret".to_string());

        let yaml = config.to_yaml().unwrap();

        assert!(!yaml.contains("super-secret"));
        assert!(yaml.contains("***"));
        assert!(yaml.contains("base_url"));
        // Durations are rendered in humantime form
        assert!(yaml.contains("30s"));
    }

    #[test]
    fn test_api_base_url_validation() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://127.0.0.1:8080/api"
        );

        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.api_base_url().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.api_base_url().is_err());

        config.api.base_url = "  ".to_string();
        assert!(config.api_base_url().is_err());
    }
}

// Configuration
//
// Loaded in order of precedence:
// 1. Environment variables (LIFEBOARD_*)
// 2. Config file (~/.config/lifeboard/config.toml)
// 3. Built-in defaults

use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the board API.
    pub base_url: String,

    /// Acting user id. Resolved via GET /api/me when absent.
    pub user_id: Option<i64>,

    /// Demo mode: serve the UI from an in-memory board.
    pub demo_mode: bool,

    /// Theme name: "dark" or "light".
    pub theme: String,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default tracing filter level when RUST_LOG is unset.
    pub level: String,
    /// Whether to also write rotating log files.
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_prefix: String,
    pub file_rotation: LogRotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => LogRotation::Hourly,
            "never" => LogRotation::Never,
            _ => LogRotation::Daily,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogRotation::Hourly => "hourly",
            LogRotation::Daily => "daily",
            LogRotation::Never => "never",
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_prefix: "lifeboard".to_string(),
            file_rotation: LogRotation::Daily,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            user_id: None,
            demo_mode: false,
            theme: "dark".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Config file structure (the subset worth persisting).
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub base_url: Option<String>,
    pub user_id: Option<i64>,
    pub theme: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_prefix: Option<String>,
    pub file_rotation: Option<String>,
}

impl Config {
    /// Config file path: ~/.config/lifeboard/config.toml
    /// Unix-style ~/.config on all platforms for consistency.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("lifeboard").join("config.toml"))
    }

    /// Create the config file with defaults if it doesn't exist, so users
    /// can discover the options.
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if present. A config file that exists but cannot be
    /// parsed is a fatal error: failing fast beats silently running with
    /// defaults while the user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse config file {}:\n  {e}", path.display());
                    eprintln!("To reset, delete the file and restart lifeboard.");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("Cannot read config file {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    /// Merge file values over defaults. Env overrides are applied on top by
    /// `from_env`; split out so tests never touch the process environment.
    pub(crate) fn merged(file: FileConfig) -> Self {
        let defaults = Config::default();
        let file_logging = file.logging.unwrap_or_default();
        let default_logging = defaults.logging;

        Self {
            base_url: file.base_url.unwrap_or(defaults.base_url),
            user_id: file.user_id,
            demo_mode: false,
            theme: file.theme.unwrap_or(defaults.theme),
            logging: LoggingConfig {
                level: file_logging.level.unwrap_or(default_logging.level),
                file_enabled: file_logging
                    .file_enabled
                    .unwrap_or(default_logging.file_enabled),
                file_dir: file_logging
                    .file_dir
                    .map(PathBuf::from)
                    .unwrap_or(default_logging.file_dir),
                file_prefix: file_logging
                    .file_prefix
                    .unwrap_or(default_logging.file_prefix),
                file_rotation: file_logging
                    .file_rotation
                    .as_deref()
                    .map(LogRotation::parse)
                    .unwrap_or(default_logging.file_rotation),
            },
        }
    }

    /// Load configuration: env > file > defaults.
    pub fn from_env() -> Self {
        let mut config = Self::merged(Self::load_file_config());

        if let Ok(url) = std::env::var("LIFEBOARD_BASE_URL") {
            config.base_url = url;
        }
        if let Some(id) = std::env::var("LIFEBOARD_USER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.user_id = Some(id);
        }
        if let Ok(v) = std::env::var("LIFEBOARD_DEMO") {
            config.demo_mode = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(theme) = std::env::var("LIFEBOARD_THEME") {
            config.theme = theme;
        }
        if let Ok(dir) = std::env::var("LIFEBOARD_LOG_DIR") {
            config.logging.file_dir = PathBuf::from(dir);
            config.logging.file_enabled = true;
        }

        config
    }

    /// Render the effective configuration as a TOML template. Single source
    /// of truth for `ensure_config_exists` and `config --reset`.
    pub fn to_toml(&self) -> String {
        let user_id = match self.user_id {
            Some(id) => format!("user_id = {id}"),
            None => "# user_id = 123456".to_string(),
        };
        format!(
            r#"# lifeboard configuration
# Values here are overridden by LIFEBOARD_* environment variables.

base_url = "{base_url}"
{user_id}
theme = "{theme}"

[logging]
level = "{level}"
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_prefix = "{file_prefix}"
file_rotation = "{file_rotation}"  # hourly | daily | never
"#,
            base_url = self.base_url,
            theme = self.theme,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display(),
            file_prefix = self.logging.file_prefix,
            file_rotation = self.logging.file_rotation.as_str(),
        )
    }
}

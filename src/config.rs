//! Application configuration management.
//!
//! Handles config directory resolution (CLI flag > `XDG_CONFIG_HOME` >
//! `SUDO_USER`-aware home) and loading `config.toml`. wgmon only reads its
//! configuration; the directory is never created here.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// User-configurable application settings.
///
/// All fields have sensible defaults. Users can override any subset via
/// `config.toml` in the config directory -- missing fields use defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `WireGuard` interface managed by this instance.
    pub interface: String,
    /// Monitor refresh interval in seconds.
    pub poll_interval: u64,
    /// Timeout for each `wg`/`wg-quick` invocation in seconds.
    pub command_timeout: u64,
    /// UI refresh rate in milliseconds.
    pub tick_rate: u64,
    /// Maximum number of lines kept in the output panel.
    pub max_output_lines: usize,
    /// Maximum number of log entries kept in the TUI event log.
    pub max_log_entries: usize,
    /// Minimum log level shown in the event log (`"debug"`, `"info"`, `"warning"`, `"error"`).
    pub log_level: String,
    /// Refuse to start unless running as root.
    pub require_root: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interface: constants::DEFAULT_INTERFACE.to_string(),
            poll_interval: constants::DEFAULT_POLL_INTERVAL,
            command_timeout: constants::DEFAULT_COMMAND_TIMEOUT,
            tick_rate: constants::DEFAULT_TICK_RATE,
            max_output_lines: constants::DEFAULT_MAX_OUTPUT_LINES,
            max_log_entries: constants::DEFAULT_MAX_LOG_ENTRIES,
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            require_root: true,
        }
    }
}

impl AppConfig {
    /// Monitor refresh interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    /// Per-command timeout as a `Duration`.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout)
    }

    /// UI tick as a `Duration`.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate)
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval must be at least 1 second".to_string(),
            ));
        }
        if self.command_timeout == 0 {
            return Err(ConfigError::Invalid(
                "command_timeout must be at least 1 second".to_string(),
            ));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid(
                "tick_rate must be at least 1 millisecond".to_string(),
            ));
        }
        validate_interface(&self.interface).map_err(ConfigError::Invalid)
    }
}

/// Checks an interface name before it is passed to `wg`/`wg-quick`.
///
/// # Errors
///
/// Returns a description of the problem when the name is empty or contains
/// whitespace or a path separator, or is too long for a kernel interface name.
pub fn validate_interface(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("interface must not be empty".to_string());
    }
    if name.len() > constants::MAX_INTERFACE_LEN {
        return Err(format!(
            "interface '{name}' is longer than {} bytes",
            constants::MAX_INTERFACE_LEN
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(format!(
            "interface '{name}' must not contain whitespace or '/'"
        ));
    }
    Ok(())
}

/// Errors that can occur while loading the configuration
#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read
    Read { path: PathBuf, source: std::io::Error },
    /// The config file is not valid TOML for [`AppConfig`]
    Parse { path: PathBuf, message: String },
    /// A value is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "Invalid config at {}: {message}", path.display())
            }
            Self::Invalid(msg) => write!(f, "Invalid config value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolves the config directory path.
///
/// Precedence: CLI flag / `WGMON_CONFIG_DIR` > `XDG_CONFIG_HOME` > `SUDO_USER`-aware home.
///
/// # Errors
///
/// Returns an error if no home directory can be determined, or if a
/// relative override cannot be made absolute.
pub fn resolve_config_dir(cli_override: Option<&PathBuf>) -> std::io::Result<PathBuf> {
    if let Some(dir) = cli_override {
        // Resolve relative paths so the config dir is stable regardless of cwd.
        return if dir.is_relative() {
            Ok(std::env::current_dir()?.join(dir))
        } else {
            Ok(dir.clone())
        };
    }

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let xdg_path = PathBuf::from(xdg);
        if xdg_path.is_absolute() {
            return Ok(xdg_path.join(constants::APP_NAME));
        }
    }

    let home = real_user_home().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Home directory not found")
    })?;
    Ok(home.join(".config").join(constants::APP_NAME))
}

/// Resolves the real user's home directory, accounting for sudo.
///
/// When running as root via `sudo`, `$HOME` points to `/root`. This function
/// checks `SUDO_USER` and looks up that user's actual home directory from
/// `/etc/passwd` so the invoking user's config is picked up.
fn real_user_home() -> Option<PathBuf> {
    if crate::utils::is_root() {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Some(home) = home_dir_for_user(&sudo_user) {
                return Some(home);
            }
        }
    }
    dirs::home_dir()
}

/// Looks up a user's home directory from `/etc/passwd` via `getpwnam`.
#[cfg(unix)]
#[allow(unsafe_code)]
fn home_dir_for_user(username: &str) -> Option<PathBuf> {
    use std::ffi::{CStr, CString};
    let c_name = CString::new(username).ok()?;
    // SAFETY: getpwnam returns a pointer to a static struct. We copy the
    // home directory string immediately so the pointer is not held.
    unsafe {
        let pw = libc::getpwnam(c_name.as_ptr());
        if pw.is_null() {
            return None;
        }
        let home = CStr::from_ptr((*pw).pw_dir);
        home.to_str().ok().map(PathBuf::from)
    }
}

#[cfg(not(unix))]
fn home_dir_for_user(_username: &str) -> Option<PathBuf> {
    None
}

/// Loads `AppConfig` from `config.toml` in the given directory.
///
/// Returns defaults if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or
/// fails [`AppConfig::validate`].
pub fn load_config(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: config_path.clone(),
        message: e.to_string(),
    })?;

    config.validate()?;
    Ok(config)
}

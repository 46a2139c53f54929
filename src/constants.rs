//! Application-wide constants and configuration values.
//!
//! This module defines all static configuration values used throughout wgmon,
//! including timing defaults, external program names, and UI messages.

// === Application Metadata ===

/// Application name and title (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Defaults ===
// These are the compiled-in defaults. Users can override them via config.toml.
// AppConfig::default() references these so there is exactly one source of truth.

/// Default `WireGuard` interface.
pub const DEFAULT_INTERFACE: &str = "wg0";
/// Default monitor refresh interval (seconds).
pub const DEFAULT_POLL_INTERVAL: u64 = 5;
/// Default timeout for a single `wg`/`wg-quick` invocation (seconds).
pub const DEFAULT_COMMAND_TIMEOUT: u64 = 10;
/// Default UI refresh rate in milliseconds.
pub const DEFAULT_TICK_RATE: u64 = 250;
/// Default capacity of the output panel, in lines.
pub const DEFAULT_MAX_OUTPUT_LINES: usize = 5000;
/// Default maximum number of log entries kept in memory.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 1000;
/// Default minimum log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Shortest interval the poller will sleep between invocations.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
/// How often a running child is checked for exit while waiting on it.
pub const CHILD_POLL_MS: u64 = 20;

// === Paths & Environment ===

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// === External Programs ===

/// `WireGuard` status tool.
pub const WG_BIN: &str = "wg";
/// `WireGuard` interface up/down helper.
pub const WG_QUICK_BIN: &str = "wg-quick";
/// Longest interface name the kernel accepts (`IFNAMSIZ` minus the NUL).
pub const MAX_INTERFACE_LEN: usize = 15;
/// Programs that must be on `PATH` for wgmon to work.
pub const REQUIRED_PROGRAMS: [&str; 2] = [WG_BIN, WG_QUICK_BIN];

// === Logging ===

/// Width of the category column in the event log.
pub const LOG_CATEGORY_WIDTH: usize = 6;
/// Width of `[HH:MM:SS] LEVEL CATEGORY ` before the message.
pub const LOG_PREFIX_WIDTH: usize = 24;

// === UI Labels & Titles ===

pub const TITLE_OUTPUT: &str = " Output ";
pub const TITLE_OUTPUT_PAUSED: &str = " Output [Paused - G to resume] ";
pub const TITLE_EVENT_LOG: &str = " Event Log [Live] ";
pub const TITLE_EVENT_LOG_PAUSED: &str = " Event Log [Paused - G to resume] ";
pub const MSG_NO_OUTPUT: &str = "No output yet. Press 's' to show interface status.";
pub const MSG_NO_ACTIVITY: &str = "No activity yet";

// === Messages: Output Panel ===

pub const MSG_BRINGING_UP: &str = "Bringing up WireGuard interface ";
pub const MSG_TEARING_DOWN: &str = "Tearing down WireGuard interface ";
pub const MSG_FETCHING_STATS: &str = "Fetching statistics for ";
pub const MSG_MONITOR_STARTED: &str = "Monitoring started on interface ";
pub const MSG_MONITOR_STOPPED: &str = "Monitoring stopped.";
pub const MSG_MONITOR_NOT_RUNNING: &str = "Monitoring was not running.";
pub const MSG_MONITOR_ALREADY_RUNNING: &str = "Monitoring is already running.";
pub const MSG_UPDATE_HEADER: &str = "Update:";
pub const MSG_ERROR_HEADER: &str = "Error:";
pub const MSG_TIMEOUT: &str = "Error: command timed out after ";
pub const MSG_LAUNCH_FAILED: &str = "Exception: failed to launch ";
pub const MSG_WAITING_FOR_WORKERS: &str = "Waiting for running commands to finish...";

// === Messages: Startup ===

pub const ERR_MISSING_PROGRAMS: &str =
    "The following commands are not available on PATH: ";
pub const HINT_INSTALL: &str =
    "Install wireguard-tools before running wgmon (e.g. sudo apt install wireguard-tools).";
pub const ERR_NOT_ROOT: &str = "wgmon must be run as root.";
pub const HINT_SUDO: &str = "Run 'sudo wgmon', or pass --no-root-check to skip this check.";

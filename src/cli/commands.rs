//! CLI command handlers.
//!
//! Headless counterparts of the TUI actions. Output goes to stdout through a
//! [`StdoutSink`]; log entries are echoed to stderr by the caller.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use color_eyre::Result;

use crate::cli::args::Commands;
use crate::config::AppConfig;
use crate::constants;
use crate::core::{self, Delivery, Poller, Sink, StdoutSink};
use crate::utils;
use crate::vpn::{self, WgAction};

/// Inputs shared by every subcommand.
pub struct CommandContext<'a> {
    pub config: &'a AppConfig,
    pub config_dir: &'a Path,
    /// How the config directory was chosen, for `info`.
    pub config_dir_source: &'a str,
    /// Whether a missing root privilege counts as a failure.
    pub require_root: bool,
}

/// Runs `command`. Returns `false` when the process should exit with status 1.
#[allow(clippy::unnecessary_wraps)]
pub fn handle_command(command: &Commands, ctx: &CommandContext<'_>) -> Result<bool> {
    let ok = match command {
        Commands::Up => run_once(WgAction::Up, ctx.config, &StdoutSink::default()),
        Commands::Down => run_once(WgAction::Down, ctx.config, &StdoutSink::default()),
        Commands::Show => run_once(WgAction::Show, ctx.config, &StdoutSink::default()),
        Commands::Watch { interval, count } => {
            let interval = interval.map_or_else(|| ctx.config.poll_interval(), Duration::from_secs);
            watch(ctx.config, interval, *count)
        }
        Commands::Check => handle_check(ctx.require_root),
        Commands::Info => {
            handle_info(ctx);
            true
        }
    };
    Ok(ok)
}

/// Runs one `wg`/`wg-quick` action and delivers its result to `sink`.
pub fn run_once(action: WgAction, config: &AppConfig, sink: &dyn Sink) -> bool {
    let spec = action.spec(&config.interface);
    let result = core::execute(&spec, config.command_timeout());
    let ok = result.is_success();
    sink.deliver(Delivery::result(action.tag(), result));
    ok
}

/// Forwards to stdout and wakes the waiting thread after every update.
struct WatchSink {
    out: StdoutSink,
    delivered: AtomicU64,
    failed: AtomicU64,
    notify: Mutex<mpsc::Sender<()>>,
}

impl Sink for WatchSink {
    fn deliver(&self, delivery: Delivery) {
        if delivery.is_failure() {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        self.out.deliver(delivery);
        self.delivered.fetch_add(1, Ordering::SeqCst);
        if let Ok(tx) = self.notify.lock() {
            let _ = tx.send(());
        }
    }
}

/// Polls `wg show` until `count` updates were printed, or forever.
///
/// Succeeds when no update failed.
fn watch(config: &AppConfig, interval: Duration, count: Option<u64>) -> bool {
    let (tx, rx) = mpsc::channel();
    let sink = Arc::new(WatchSink {
        out: StdoutSink::default(),
        delivered: AtomicU64::new(0),
        failed: AtomicU64::new(0),
        notify: Mutex::new(tx),
    });

    let mut poller = Poller::new(config.command_timeout());
    sink.out.deliver(Delivery::notice(format!(
        "{}{}...",
        constants::MSG_MONITOR_STARTED,
        config.interface
    )));
    let _ = poller.start(
        interval,
        vpn::monitor_spec(&config.interface),
        Arc::clone(&sink) as Arc<dyn Sink>,
    );

    loop {
        if rx.recv().is_err() {
            break;
        }
        if count.is_some_and(|n| sink.delivered.load(Ordering::SeqCst) >= n) {
            break;
        }
    }
    poller.shutdown();

    sink.failed.load(Ordering::SeqCst) == 0
}

/// Result of the startup checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preflight {
    /// Required programs not found on `PATH`.
    pub missing: Vec<String>,
    pub is_root: bool,
}

impl Preflight {
    pub fn run() -> Self {
        Self {
            missing: vpn::missing_tools(),
            is_root: utils::is_root(),
        }
    }

    /// Startup error lines, each followed by its hint. Empty when good to go.
    pub fn problems(&self, require_root: bool) -> Vec<(String, &'static str)> {
        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push((
                format!("{}{}", constants::ERR_MISSING_PROGRAMS, self.missing.join(", ")),
                constants::HINT_INSTALL,
            ));
        }
        if require_root && !self.is_root {
            problems.push((constants::ERR_NOT_ROOT.to_string(), constants::HINT_SUDO));
        }
        problems
    }
}

fn handle_check(require_root: bool) -> bool {
    let preflight = Preflight::run();

    for program in constants::REQUIRED_PROGRAMS {
        let found = !preflight.missing.iter().any(|m| m == program);
        println!("  {} {program}", if found { "✅" } else { "❌" });
    }
    println!(
        "  {} root privileges",
        if preflight.is_root { "✅" } else { "❌" }
    );

    let problems = preflight.problems(require_root);
    for (error, hint) in &problems {
        eprintln!();
        eprintln!("Error: {error}");
        eprintln!("  {hint}");
    }
    problems.is_empty()
}

/// Prints config directory, effective settings and runtime info.
fn handle_info(ctx: &CommandContext<'_>) {
    let config = ctx.config;
    let config_file = ctx.config_dir.join(constants::CONFIG_FILE_NAME);

    println!("{} v{}", constants::APP_NAME, constants::APP_VERSION);
    println!();
    println!(
        "Config directory: {} ({})",
        ctx.config_dir.display(),
        ctx.config_dir_source
    );
    println!(
        "Config file:      {} ({})",
        config_file.display(),
        if config_file.is_file() {
            "loaded"
        } else {
            "not found, using defaults"
        }
    );
    println!();
    println!("interface         = {}", config.interface);
    println!("poll_interval     = {}s", config.poll_interval);
    println!("command_timeout   = {}s", config.command_timeout);
    println!("tick_rate         = {}ms", config.tick_rate);
    println!("max_output_lines  = {}", config.max_output_lines);
    println!("max_log_entries   = {}", config.max_log_entries);
    println!("log_level         = {}", config.log_level);
    println!("require_root      = {}", ctx.require_root);
    println!();
    println!(
        "Running as root:  {}",
        if utils::is_root() { "yes" } else { "no" }
    );
}

//! # wgmon
//!
//! Terminal monitor for a single `WireGuard` interface. It brings the
//! interface up or down with `wg-quick` and shows `wg show` output, once or
//! on a timer.
//!
//! ## Modules
//! - [`app`]: Core application state and logic.
//! - [`cli`]: Command-line argument parsing and headless subcommands.
//! - [`config`]: Configuration management.
//! - [`core`]: Command runner, availability check, poller and delivery sinks.
//! - [`event`]: Event loop handling.
//! - [`ui`]: TUI rendering and widget definitions.
//! - [`vpn`]: The `wg`/`wg-quick` invocations wgmon performs.

mod app;
mod cli;
mod config;
mod constants;
mod core;
mod event;
mod logger;
mod message;
mod state;
mod theme;
mod ui;
mod utils;
mod vpn;

use app::App;
use clap::Parser;
use cli::args::Args;
use cli::commands::{CommandContext, Preflight};
use color_eyre::Result;
use event::{Event, EventHandler};

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse arguments
    let args = Args::parse();

    // Determine how config_dir was provided (for `info` command)
    let config_dir_source = match (&args.config_dir, std::env::var_os("WGMON_CONFIG_DIR")) {
        (None, _) => "default",
        (Some(cli), Some(env)) if cli.as_os_str() == env.as_os_str() => "from WGMON_CONFIG_DIR",
        (Some(_), _) => "from --config-dir",
    };

    // Resolve config directory (CLI flag > XDG > SUDO_USER-aware home)
    let config_dir = config::resolve_config_dir(args.config_dir.as_ref())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to resolve config directory: {e}"))?;

    // Load config.toml (or use defaults)
    let mut app_config = match config::load_config(&config_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            eprintln!("Fix the file or remove it to use defaults:");
            eprintln!("  nano {}/{}", config_dir.display(), constants::CONFIG_FILE_NAME);
            eprintln!("  rm {}/{}", config_dir.display(), constants::CONFIG_FILE_NAME);
            std::process::exit(1);
        }
    };

    if let Some(interface) = args.interface {
        if let Err(e) = config::validate_interface(&interface) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        app_config.interface = interface;
    }
    let require_root = app_config.require_root && !args.no_root_check;

    logger::configure(&app_config.log_level, app_config.max_log_entries);

    // Handle CLI commands (up, down, show, watch, check, info)
    if let Some(command) = &args.command {
        logger::set_echo_stderr(true);
        let ctx = CommandContext {
            config: &app_config,
            config_dir: &config_dir,
            config_dir_source,
            require_root,
        };
        if !cli::commands::handle_command(command, &ctx)? {
            std::process::exit(1);
        }
        return Ok(());
    }

    let problems = Preflight::run().problems(require_root);
    if !problems.is_empty() {
        for (error, hint) in &problems {
            eprintln!("Error: {error}");
            eprintln!("  {hint}");
        }
        std::process::exit(1);
    }

    // Run the TUI application
    let mut app = App::new(app_config);
    let terminal = init_terminal()?;
    let result = run_tui(terminal, &mut app);
    restore_terminal();
    app.shutdown();

    result
}

/// Runs the main TUI event loop.
fn run_tui(mut terminal: ratatui::DefaultTerminal, app: &mut App) -> Result<()> {
    let events = EventHandler::new(app.config.tick_rate());

    // Initial draw
    app.process_external();
    terminal.draw(|frame| ui::render(frame, app))?;

    while !app.should_quit {
        // Process event
        match events.next()? {
            Event::Key(key_event) => app.handle_key(key_event),
            Event::Mouse(mouse_event) => app.handle_mouse(mouse_event),
            Event::Tick => app.on_tick(),
            Event::Resize(width, height) => app.on_resize(width, height),
        }

        // Drain worker and monitor output before drawing
        app.process_external();
        terminal.draw(|frame| ui::render(frame, app))?;
    }

    Ok(())
}

fn init_terminal() -> Result<ratatui::DefaultTerminal> {
    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), crossterm::event::EnableMouseCapture)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal() {
    let _ = crossterm::execute!(std::io::stdout(), crossterm::event::DisableMouseCapture);
    ratatui::restore();
}

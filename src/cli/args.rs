//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminal monitor for a `WireGuard` interface: bring it up or down and watch `wg show`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Override config directory (default: platform config dir, honors `XDG_CONFIG_HOME` and sudo)
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        env = "WGMON_CONFIG_DIR",
        global = true
    )]
    pub config_dir: Option<PathBuf>,

    /// `WireGuard` interface to manage (overrides `interface` in config.toml)
    #[arg(
        short = 'i',
        long,
        value_name = "NAME",
        env = "WGMON_INTERFACE",
        global = true
    )]
    pub interface: Option<String>,

    /// Start even when not running as root
    #[arg(long, global = true)]
    pub no_root_check: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Bring the interface up with wg-quick and print the result
    Up,
    /// Tear the interface down with wg-quick and print the result
    Down,
    /// Print `wg show` for the interface once
    Show,
    /// Print `wg show` repeatedly until interrupted
    Watch {
        /// Seconds between updates (default: `poll_interval` from config)
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        /// Stop after this many updates
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },
    /// Report whether wg, wg-quick and root privileges are available
    Check,
    /// Show config directory, effective settings and runtime info
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_starts_tui() {
        let args = Args::try_parse_from(["wgmon"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.no_root_check);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["wgmon", "show", "-i", "wg1", "--no-root-check"]).unwrap();
        assert_eq!(args.command, Some(Commands::Show));
        assert_eq!(args.interface.as_deref(), Some("wg1"));
        assert!(args.no_root_check);
    }

    #[test]
    fn test_watch_options() {
        let args =
            Args::try_parse_from(["wgmon", "watch", "--interval", "2", "--count", "3"]).unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Watch {
                interval: Some(2),
                count: Some(3)
            })
        );
    }

    #[test]
    fn test_watch_rejects_zero_interval() {
        assert!(Args::try_parse_from(["wgmon", "watch", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_config_dir_flag() {
        let args = Args::try_parse_from(["wgmon", "-C", "/tmp/wgmon-test", "info"]).unwrap();
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/wgmon-test")));
        assert_eq!(args.command, Some(Commands::Info));
    }
}

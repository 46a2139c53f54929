//! `WireGuard` command catalogue.
//!
//! wgmon never talks to `WireGuard` directly: it runs `wg-quick` and `wg`
//! and shows what they print. This module names those invocations.

use crate::constants;
use crate::core::availability;
use crate::core::{CommandSpec, OutputTag};

/// The fixed operations wgmon can perform on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WgAction {
    /// `wg-quick up <interface>`
    Up,
    /// `wg-quick down <interface>`
    Down,
    /// `wg show <interface>`
    Show,
}

impl WgAction {
    /// Command line for this action against `interface`.
    pub fn spec(self, interface: &str) -> CommandSpec {
        match self {
            Self::Up => CommandSpec::new(constants::WG_QUICK_BIN, ["up", interface]),
            Self::Down => CommandSpec::new(constants::WG_QUICK_BIN, ["down", interface]),
            Self::Show => CommandSpec::new(constants::WG_BIN, ["show", interface]),
        }
    }

    pub const fn tag(self) -> OutputTag {
        match self {
            Self::Up => OutputTag::Up,
            Self::Down => OutputTag::Down,
            Self::Show => OutputTag::Show,
        }
    }

    /// Line shown before the action's worker is spawned.
    pub fn notice(self, interface: &str) -> String {
        let prefix = match self {
            Self::Up => constants::MSG_BRINGING_UP,
            Self::Down => constants::MSG_TEARING_DOWN,
            Self::Show => constants::MSG_FETCHING_STATS,
        };
        format!("{prefix}{interface}...")
    }
}

/// Command polled by the monitor.
pub fn monitor_spec(interface: &str) -> CommandSpec {
    WgAction::Show.spec(interface)
}

/// Required `WireGuard` tools that are not on `PATH`.
pub fn missing_tools() -> Vec<String> {
    availability::missing_programs(&constants::REQUIRED_PROGRAMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_specs() {
        assert_eq!(WgAction::Up.spec("wg0").argv(), ["wg-quick", "up", "wg0"]);
        assert_eq!(WgAction::Down.spec("wg1").argv(), ["wg-quick", "down", "wg1"]);
        assert_eq!(WgAction::Show.spec("wg0").argv(), ["wg", "show", "wg0"]);
        assert_eq!(monitor_spec("wg0"), WgAction::Show.spec("wg0"));
    }

    #[test]
    fn test_action_tags() {
        assert_eq!(WgAction::Up.tag(), OutputTag::Up);
        assert_eq!(WgAction::Down.tag(), OutputTag::Down);
        assert_eq!(WgAction::Show.tag(), OutputTag::Show);
    }

    #[test]
    fn test_notices_name_interface() {
        assert_eq!(
            WgAction::Up.notice("wg0"),
            "Bringing up WireGuard interface wg0..."
        );
        assert_eq!(WgAction::Show.notice("wg2"), "Fetching statistics for wg2...");
    }
}

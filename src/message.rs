//! Message system for the wgmon application.
//!
//! All state mutations flow through this centralized Message enum,
//! following the Elm Architecture (TEA) pattern. Key presses, ticks and
//! deliveries from background workers all become messages.

use crate::core::Delivery;

/// Direction for scrolling movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMove {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// All messages that can modify application state.
#[derive(Debug, Clone)]
pub enum Message {
    // === Interface actions ===
    /// `wg-quick up <interface>`
    Up,
    /// `wg-quick down <interface>`
    Down,
    /// `wg show <interface>`, once
    Show,

    // === Monitor ===
    StartMonitor,
    StopMonitor,

    // === Navigation ===
    /// Focus the other panel
    NextPanel,
    /// Scroll the focused panel
    Scroll(ScrollMove),

    // === System ===
    /// Empty the output panel
    ClearOutput,
    /// Output from a worker or the monitor
    Delivery(Delivery),
    /// Periodic heartbeat tick
    Tick,
    /// Terminal resize event
    Resize(u16, u16),
    /// Quit the application
    Quit,
}

//! Color theme definitions.
//!
//! Dark slate panels with cyan accents; status colors follow the usual
//! green/amber/red convention.

use ratatui::style::Color;

// === Primary Accent (Cyan/Teal) ===

/// Primary cyan accent - main highlight color.
pub const CYAN_PRIMARY: Color = Color::Rgb(6, 182, 212);
/// Lighter cyan for highlights.
pub const CYAN_LIGHT: Color = Color::Rgb(34, 211, 238);
/// Darker cyan for borders.
pub const CYAN_DARK: Color = Color::Rgb(8, 145, 178);

// === Status Colors ===

pub const EMERALD: Color = Color::Rgb(16, 185, 129);
pub const CORAL_RED: Color = Color::Rgb(239, 68, 68);
pub const AMBER: Color = Color::Rgb(245, 158, 11);

// === Text Colors ===

pub const TEXT_WHITE: Color = Color::Rgb(248, 250, 252);
pub const TEXT_LIGHT: Color = Color::Rgb(203, 213, 225);
pub const TEXT_MUTED: Color = Color::Rgb(148, 163, 184);

/// Separators, scrollbar tracks and the log category column.
pub const SLATE: Color = Color::Rgb(76, 86, 106);
/// Info-level badge in the event log.
pub const FROST: Color = Color::Rgb(129, 161, 193);

// === Semantic Color Aliases ===

pub const TEXT_PRIMARY: Color = TEXT_WHITE;
pub const TEXT_SECONDARY: Color = TEXT_MUTED;
pub const ACCENT_PRIMARY: Color = CYAN_PRIMARY;
pub const ACCENT_SECONDARY: Color = CYAN_LIGHT;
pub const SUCCESS: Color = EMERALD;
pub const WARNING: Color = AMBER;
pub const ERROR: Color = CORAL_RED;
/// Inactive/disabled state color.
pub const INACTIVE: Color = Color::Gray;

// === UI Element Colors ===

pub const BORDER_DEFAULT: Color = CYAN_DARK;
pub const BORDER_FOCUSED: Color = CYAN_PRIMARY;

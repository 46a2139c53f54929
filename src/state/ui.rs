//! UI state types.

use std::time::{Duration, Instant};

/// Duration for toast notifications to remain visible.
pub const DISMISS_DURATION: Duration = Duration::from_secs(4);

/// Currently focused UI panel for keyboard navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FocusedPanel {
    /// Command output (top).
    #[default]
    Output,
    /// Event log (bottom).
    Logs,
}

impl FocusedPanel {
    /// The other panel.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Output => Self::Logs,
            Self::Logs => Self::Output,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Output => "Output",
            Self::Logs => "Logs",
        }
    }
}

/// Scroll position of a line-oriented panel.
///
/// While `follow` is set the panel sticks to the newest lines. Scrolling up
/// pauses it; reaching the bottom again resumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollState {
    /// Index of the first visible line when not following.
    pub offset: usize,
    pub follow: bool,
    /// Visible lines, recorded by the renderer.
    pub viewport: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
            viewport: 1,
        }
    }
}

impl ScrollState {
    fn max_offset(&self, total: usize) -> usize {
        total.saturating_sub(self.viewport.max(1))
    }

    /// Index of the first line to draw for a panel holding `total` lines.
    pub fn start(&self, total: usize) -> usize {
        if self.follow {
            self.max_offset(total)
        } else {
            self.offset.min(self.max_offset(total))
        }
    }

    pub fn scroll(&mut self, mv: crate::message::ScrollMove, total: usize) {
        use crate::message::ScrollMove;

        let max = self.max_offset(total);
        let page = self.viewport.saturating_sub(1).max(1);
        let current = self.start(total);

        let target = match mv {
            ScrollMove::Up => current.saturating_sub(1),
            ScrollMove::Down => current.saturating_add(1),
            ScrollMove::PageUp => current.saturating_sub(page),
            ScrollMove::PageDown => current.saturating_add(page),
            ScrollMove::Top => 0,
            ScrollMove::Bottom => max,
        };

        self.offset = target.min(max);
        self.follow = self.offset >= max;
    }

    /// Keeps the view on the same text after `evicted` lines left the front.
    pub fn on_evicted(&mut self, evicted: usize) {
        self.offset = self.offset.saturating_sub(evicted);
    }

    pub fn reset(&mut self) {
        self.offset = 0;
        self.follow = true;
    }
}

/// Types of toast notifications for color coding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToastType {
    /// Informational message (Blue)
    #[default]
    Info,
    /// Success message (Green)
    Success,
    /// Warning message (Yellow)
    Warning,
    /// Error message (Red)
    Error,
}

/// Toast notification for temporary messages.
#[derive(Clone, Debug)]
pub struct Toast {
    /// Message to display.
    pub message: String,
    /// Type of toast for styling.
    #[allow(clippy::struct_field_names)]
    pub toast_type: ToastType,
    /// When the toast should disappear.
    pub expires: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            expires: Instant::now() + DISMISS_DURATION,
        }
    }

    /// Check if the toast notification has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires
    }
}

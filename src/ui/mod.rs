//! TUI rendering.

mod dashboard;
pub mod widgets;

use ratatui::Frame;

use crate::app::App;

/// Draws one frame of the interface.
pub fn render(frame: &mut Frame, app: &mut App) {
    dashboard::render(frame, app);
    widgets::toast::render(frame, app);
}

//! Footer widget with context-aware keybinding hints

use crate::app::App;
use crate::theme;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Hints for the current state, most important first.
pub fn hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("u", "Up"), ("d", "Down"), ("s", "Show")];

    if app.is_monitoring() {
        hints.push(("M", "Stop Monitor"));
    } else {
        hints.push(("m", "Monitor"));
    }

    hints.extend_from_slice(&[
        ("c", "Clear"),
        ("Tab", "Switch Panel"),
        ("↑↓", "Scroll"),
        ("q", "Quit"),
    ]);
    hints
}

/// Render dashboard footer with context-aware shortcuts
pub fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    render_hints(frame, area, &hints(app), app.focused_panel.name());
}

fn render_hints(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], panel_name: &str) {
    let chunks = Layout::horizontal([
        Constraint::Min(0),     // Hints (left)
        Constraint::Length(16), // Branding (right)
    ])
    .split(area);

    let key_style = Style::default()
        .fg(theme::ACCENT_PRIMARY)
        .add_modifier(Modifier::BOLD);

    let panel_indicator = format!("[{panel_name}] ");
    let mut current_width = panel_indicator.chars().count();
    let max_width = chunks[0].width as usize;
    let mut hint_spans = vec![Span::styled(panel_indicator, key_style)];

    for (i, (key, action)) in hints.iter().enumerate() {
        // "key" + " " + "action", plus " │ " before every item but the first
        let sep_width = if i > 0 { 3 } else { 0 };
        let item_width = key.chars().count() + 1 + action.chars().count() + sep_width;

        if current_width + item_width > max_width {
            break;
        }

        if i > 0 {
            hint_spans.push(Span::styled(" │ ", Style::default().fg(theme::SLATE)));
        }
        hint_spans.push(Span::styled(*key, key_style));
        hint_spans.push(Span::raw(" "));
        hint_spans.push(Span::styled(
            *action,
            Style::default().fg(theme::TEXT_SECONDARY),
        ));

        current_width += item_width;
    }
    frame.render_widget(Paragraph::new(Line::from(hint_spans)), chunks[0]);

    let branding = Line::from(Span::styled(
        format!(
            "{} v{} ",
            crate::constants::APP_NAME,
            crate::constants::APP_VERSION
        ),
        Style::default().fg(theme::SLATE),
    ));
    frame.render_widget(
        Paragraph::new(branding).alignment(Alignment::Right),
        chunks[1],
    );
}

//! Transient notification box in the top-right corner.

use crate::app::{App, ToastType};
use crate::theme;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const MAX_WIDTH: u16 = 48;

pub fn render(frame: &mut Frame, app: &App) {
    let Some(toast) = &app.toast else {
        return;
    };

    let color = match toast.toast_type {
        ToastType::Info => theme::ACCENT_PRIMARY,
        ToastType::Success => theme::SUCCESS,
        ToastType::Warning => theme::WARNING,
        ToastType::Error => theme::ERROR,
    };

    let area = frame.area();
    let text_width = u16::try_from(toast.message.chars().count()).unwrap_or(u16::MAX);
    let width = text_width.saturating_add(4).min(MAX_WIDTH).min(area.width);
    let inner_width = width.saturating_sub(2).max(1);
    let height = text_width
        .div_ceil(inner_width)
        .saturating_add(2)
        .min(area.height);

    // Below the header, against the right edge
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1_u16.min(area.height.saturating_sub(height)),
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(toast.message.as_str())
            .style(Style::default().fg(theme::TEXT_PRIMARY))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
        popup,
    );
}

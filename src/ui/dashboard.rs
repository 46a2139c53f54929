use crate::app::{App, FocusedPanel};
use crate::core::OutputTag;
use crate::state::OutputLine;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use super::widgets;
use crate::constants;
use crate::logger;
use crate::theme;
use crate::utils;

/// Render the dashboard view
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // 1. Status Header (1 row)
    // 2. Output + Event Log (Flexible)
    // 3. Command Footer (1 row)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, app, chunks[0]);
    widgets::footer::render_dashboard(frame, app, chunks[2]);

    let workspace = Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    render_output(frame, app, workspace[0]);
    render_event_log(frame, app, workspace[1]);

    // Register Click Areas
    app.panel_areas.insert(FocusedPanel::Output, workspace[0]);
    app.panel_areas.insert(FocusedPanel::Logs, workspace[1]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let separator = || Span::styled(" │ ", Style::default().fg(theme::SLATE));

    let (state_text, state_color) = if app.is_monitoring() {
        ("● LIVE", theme::SUCCESS)
    } else {
        ("○ IDLE", theme::INACTIVE)
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", constants::APP_NAME.to_uppercase()),
            Style::default()
                .fg(theme::ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled("Interface: ", Style::default().fg(theme::TEXT_SECONDARY)),
        Span::styled(
            app.config.interface.as_str(),
            Style::default()
                .fg(theme::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(
            state_text,
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" every {}s", app.config.poll_interval),
            Style::default().fg(theme::TEXT_SECONDARY),
        ),
        separator(),
    ];

    if app.is_root {
        spans.push(Span::styled("root", Style::default().fg(theme::SUCCESS)));
    } else {
        spans.push(Span::styled(
            "not root",
            Style::default().fg(theme::WARNING),
        ));
    }

    let pending = app.pending_actions();
    if pending > 0 {
        spans.push(separator());
        spans.push(Span::styled(
            format!("⟳ {pending} running"),
            Style::default().fg(theme::ACCENT_SECONDARY),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn panel_block(app: &App, panel: FocusedPanel, title: &'static str) -> Block<'static> {
    let border_style = if app.focused_panel == panel {
        Style::default().fg(theme::BORDER_FOCUSED)
    } else {
        Style::default().fg(theme::BORDER_DEFAULT)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn render_output(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.output_scroll.follow {
        constants::TITLE_OUTPUT
    } else {
        constants::TITLE_OUTPUT_PAUSED
    };
    let block = panel_block(app, FocusedPanel::Output, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible_lines = inner.height as usize;
    app.output_scroll.viewport = visible_lines;

    if app.output.is_empty() {
        frame.render_widget(
            Paragraph::new(constants::MSG_NO_OUTPUT)
                .style(Style::default().fg(theme::TEXT_SECONDARY))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let total = app.output.len();
    let start_idx = app.output_scroll.start(total);
    let lines: Vec<Line> = app
        .output
        .window(start_idx, start_idx + visible_lines)
        .map(output_line)
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
    render_scrollbar(frame, area, total.saturating_sub(visible_lines), start_idx);
}

fn output_line(line: &OutputLine) -> Line<'_> {
    let style = if line.is_error {
        Style::default().fg(theme::ERROR)
    } else {
        match line.tag {
            OutputTag::Notice => Style::default().fg(theme::ACCENT_PRIMARY),
            OutputTag::Update if line.text.ends_with(constants::MSG_UPDATE_HEADER) => {
                Style::default()
                    .fg(theme::TEXT_SECONDARY)
                    .add_modifier(Modifier::BOLD)
            }
            OutputTag::Up | OutputTag::Down => Style::default().fg(theme::SUCCESS),
            OutputTag::Show | OutputTag::Update => Style::default().fg(theme::TEXT_LIGHT),
        }
    };
    Line::from(Span::styled(line.text.as_str(), style))
}

fn render_event_log(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.logs_scroll.follow {
        constants::TITLE_EVENT_LOG
    } else {
        constants::TITLE_EVENT_LOG_PAUSED
    };
    let block = panel_block(app, FocusedPanel::Logs, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible_lines = inner.height as usize;
    app.logs_scroll.viewport = visible_lines;

    // Get logs from centralized logger
    let all_logs = logger::get_logs();

    if all_logs.is_empty() {
        frame.render_widget(
            Paragraph::new(constants::MSG_NO_ACTIVITY).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let start_idx = app.logs_scroll.start(all_logs.len());
    let end_idx = (start_idx + visible_lines).min(all_logs.len());
    let max_msg_len = (inner.width as usize).saturating_sub(constants::LOG_PREFIX_WIDTH);

    let logs: Vec<Line> = all_logs[start_idx..end_idx]
        .iter()
        .map(|entry| {
            // Format: [HH:MM:SS] LEVEL  CATEGORY  message
            let time_str = utils::format_system_time_local(entry.timestamp);
            let cat = format!(
                "{:<width$}",
                entry.category,
                width = constants::LOG_CATEGORY_WIDTH
            );

            let level_color = match entry.level {
                logger::LogLevel::Error => theme::ERROR,
                logger::LogLevel::Warning => theme::WARNING,
                logger::LogLevel::Info => theme::FROST,
                logger::LogLevel::Debug => Color::DarkGray,
            };
            let msg_color = match entry.level {
                logger::LogLevel::Info => theme::INACTIVE,
                _ => level_color,
            };

            Line::from(vec![
                Span::styled(
                    format!("[{time_str}] "),
                    Style::default().fg(theme::TEXT_SECONDARY),
                ),
                Span::styled(
                    format!("{} ", entry.level.prefix()),
                    Style::default().fg(level_color),
                ),
                Span::styled(format!("{cat}  "), Style::default().fg(theme::SLATE)),
                Span::styled(
                    utils::truncate(&entry.message, max_msg_len),
                    Style::default().fg(msg_color),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(logs), inner);
    render_scrollbar(
        frame,
        area,
        all_logs.len().saturating_sub(visible_lines),
        start_idx,
    );
}

fn render_scrollbar(frame: &mut Frame, area: Rect, content_length: usize, position: usize) {
    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .style(Style::default().fg(theme::SLATE))
        .thumb_style(Style::default().fg(theme::ACCENT_PRIMARY));

    let mut scrollbar_state = ScrollbarState::new(content_length).position(position);

    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

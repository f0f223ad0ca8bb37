//! Centered modal dialogs: removal confirmation, blocking error, path prompt.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::theme;

/// A `width` × `height` rect centered in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn frame_block(frame: &mut Frame, area: Rect, title: &str, border: Style) -> Rect {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        area,
    );
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Yes/no confirmation.
pub fn render_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let dialog = centered_rect(area, 50, 6);
    let inner = frame_block(
        frame,
        dialog,
        "Confirm",
        Style::default().fg(theme::ELECTRIC_YELLOW),
    );

    let text = vec![
        Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

/// Blocking error that must be acknowledged.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let dialog = centered_rect(area, 60, 7);
    let inner = frame_block(frame, dialog, "Error", Style::default().fg(theme::ERROR_RED));

    let text = vec![
        Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter ", theme::key_hint_key()),
            Span::styled("OK", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

/// Single-line text input.
pub fn render_prompt(frame: &mut Frame, area: Rect, title: &str, label: &str, input: &str) {
    let dialog = centered_rect(area, 70, 7);
    let inner = frame_block(frame, dialog, title, theme::border_focused());

    let text = vec![
        Line::from(Span::styled(
            format!("  {label}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(vec![
            Span::styled("  > ", Style::default().fg(theme::ELECTRIC_PURPLE)),
            Span::styled(input, Style::default().fg(theme::NEON_CYAN)),
            Span::styled("█", Style::default().fg(theme::NEON_CYAN)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Enter ", theme::key_hint_key()),
            Span::styled("send    ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

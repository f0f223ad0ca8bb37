//! Backend presence indicator: ●/○/◐ with color mapping.

use ratatui::style::Style;
use ratatui::text::Span;

use bridgex_core::{ConnectionStatus, Presence};

use crate::theme;

/// Returns a styled `Span` with the status dot and label.
pub fn presence_span(presence: &Presence) -> Span<'static> {
    let (symbol, color) = match presence.status {
        ConnectionStatus::Connected => ("●", theme::SUCCESS_GREEN),
        ConnectionStatus::Disconnected => ("○", theme::ERROR_RED),
        ConnectionStatus::Checking | ConnectionStatus::Unknown => ("◐", theme::ELECTRIC_YELLOW),
    };
    Span::styled(
        format!("{symbol} {}", presence.label()),
        Style::default().fg(color),
    )
}

//! Pairing overlay: shows the credential the remote device needs.
//!
//! A terminal cannot draw the backend's QR image, so the image form shows
//! the payload's media type and size, plus a prefix of the payload itself.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use bridgex_core::{CredentialDisplay, PairingSession};

use crate::theme;
use crate::widgets::dialog::centered_rect;

const PAYLOAD_PREVIEW_CHARS: usize = 48;

/// Lines describing the credential.
pub fn credential_lines(credential: &CredentialDisplay) -> Vec<Line<'static>> {
    let accent = Style::default()
        .fg(theme::NEON_CYAN)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme::DIM_WHITE);

    match credential {
        CredentialDisplay::Image { payload } => {
            let media = payload
                .strip_prefix("data:")
                .and_then(|rest| rest.split([';', ',']).next())
                .unwrap_or("image");
            let preview: String = payload.chars().take(PAYLOAD_PREVIEW_CHARS).collect();
            vec![
                Line::from(Span::styled("  ▣ Pairing code ready", accent)),
                Line::from(Span::styled(
                    format!("  {media}, {} bytes", payload.len()),
                    dim,
                )),
                Line::from(Span::styled(format!("  {preview}"), theme::key_hint())),
            ]
        }
        CredentialDisplay::Fallback { id_prefix } => vec![
            Line::from(Span::styled("  📱 Pair with device ID", accent)),
            Line::from(Span::styled(format!("  {id_prefix}..."), dim)),
        ],
        CredentialDisplay::Placeholder => vec![
            Line::from(Span::styled("  📱 Pairing started", accent)),
            Line::from(Span::styled(
                "  Open BridgeX on your phone to finish pairing",
                dim,
            )),
        ],
    }
}

pub fn render(frame: &mut Frame, area: Rect, session: &PairingSession) {
    let overlay = centered_rect(area, 64, 12);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .title(" Pair New Device ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  This device: ", theme::key_hint()),
            Span::styled(
                session.requested_device_name.clone(),
                Style::default().fg(theme::DIM_WHITE),
            ),
        ]),
        Line::from(""),
    ];
    lines.extend(credential_lines(&session.credential));
    if let Some(expires_at) = session.expires_at {
        lines.push(Line::from(Span::styled(
            format!("  Expires {}", expires_at.format("%H:%M:%S UTC")),
            theme::key_hint(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Esc ", theme::key_hint_key()),
        Span::styled("close", theme::key_hint()),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

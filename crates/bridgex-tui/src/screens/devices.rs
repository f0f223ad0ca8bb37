//! Devices screen: the paired-device directory as a navigable table.

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use bridgex_core::{DeviceRow, DirectoryView, Intent};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::last_seen::format_last_seen;

pub struct DevicesScreen {
    view: DirectoryView,
    table_state: TableState,
}

impl DevicesScreen {
    pub fn new() -> Self {
        Self {
            view: DirectoryView::default(),
            table_state: TableState::default(),
        }
    }

    fn rows(&self) -> &[DeviceRow] {
        self.view.rows()
    }

    pub fn selected(&self) -> Option<&DeviceRow> {
        self.table_state
            .selected()
            .and_then(|idx| self.rows().get(idx))
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let current = self.table_state.selected().unwrap_or(0) as isize;
        #[allow(clippy::cast_possible_wrap)]
        let next = (current + delta).clamp(0, len as isize - 1);
        #[allow(clippy::cast_sign_loss)]
        let next = next as usize;
        self.table_state.select(Some(next));
    }

    /// Keep the cursor on a row that still exists after a reload.
    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        let selected = match (len, self.table_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(idx)) => Some(idx.min(len - 1)),
        };
        self.table_state.select(selected);
    }

    fn render_message(frame: &mut Frame, area: Rect, text: &str, style: Style) {
        let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!("  {text}"), style))),
            layout[1],
        );
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let now = Utc::now();
        let header = Row::new(
            ["Name", "Type", "ID", "Last seen"]
                .into_iter()
                .map(Cell::from)
                .collect::<Vec<_>>(),
        )
        .style(theme::table_header());

        let rows: Vec<Row> = self
            .rows()
            .iter()
            .map(|row| {
                let device = &row.device;
                Row::new(vec![
                    Cell::from(device.display_name.clone()),
                    Cell::from(device.device_type.clone().unwrap_or_else(|| "─".into()))
                        .style(Style::default().fg(theme::CORAL)),
                    Cell::from(row.id_label.clone()),
                    Cell::from(format_last_seen(device.last_seen.as_ref(), now)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Fill(3),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Default for DevicesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DevicesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') => {
                if !self.rows().is_empty() {
                    self.table_state.select(Some(0));
                }
                Ok(None)
            }
            KeyCode::Char('G') => {
                let len = self.rows().len();
                if len > 0 {
                    self.table_state.select(Some(len - 1));
                }
                Ok(None)
            }
            KeyCode::Char('d') | KeyCode::Delete => Ok(self.selected().map(|row| {
                Action::Dispatch(Intent::RemoveDevice {
                    device_id: row.device.id.clone(),
                })
            })),
            KeyCode::Char('s') => Ok(self.selected().map(|row| Action::OpenSendPrompt {
                device_id: row.device.id.clone(),
                name: row.device.display_name.clone(),
            })),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::DirectoryUpdated(view) = action {
            self.view = view.clone();
            self.clamp_selection();
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let count = self.rows().len();
        let title = match self.view {
            DirectoryView::Populated(_) => format!(" Paired Devices ({count}) "),
            _ => " Paired Devices ".to_owned(),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        match &self.view {
            DirectoryView::NotLoaded => {
                Self::render_message(frame, layout[0], "Loading...", theme::key_hint());
            }
            DirectoryView::Empty => {
                Self::render_message(
                    frame,
                    layout[0],
                    "No paired devices",
                    Style::default().fg(theme::DIM_WHITE),
                );
            }
            DirectoryView::Error { detail } => {
                Self::render_message(
                    frame,
                    layout[0],
                    &format!("Failed to load devices: {detail}"),
                    Style::default().fg(theme::ERROR_RED),
                );
            }
            DirectoryView::Populated(_) => self.render_table(frame, layout[0]),
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("s ", theme::key_hint_key()),
            Span::styled("send file  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("remove", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }
}

//! Application core: event loop, modal state, intent dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bridgex_api::BackendClient;
use bridgex_core::{
    BackendProcess, Controller, CoreError, Intent, Outcome, PairingSession, PendingRemoval,
    Presence, id_label,
};

use crate::action::{Action, Notification, NotificationLevel, parse_paths};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::devices::DevicesScreen;
use crate::theme;
use crate::tui::TerminalSession;
use crate::widgets::{dialog, pairing_overlay, status_indicator};

/// Backend process spawned by this client, shared with restart tasks.
pub type ManagedBackend = Arc<Mutex<BackendProcess>>;

/// Path entry for a file transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SendPrompt {
    device_id: String,
    name: String,
    input: String,
}

/// Top-level application state and event loop.
pub struct App {
    controller: Controller<BackendClient>,
    /// `None` when the backend was started outside this client.
    backend: Option<ManagedBackend>,
    devices: DevicesScreen,
    /// Last published presence, drives the status bar and the pair key.
    presence: Presence,
    /// Open pairing overlay.
    pairing: Option<PairingSession>,
    /// Removal awaiting y/n.
    pending_removal: Option<PendingRemoval>,
    /// Blocking error dialog; captures input until acknowledged.
    error_dialog: Option<String>,
    send_prompt: Option<SendPrompt>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(controller: Controller<BackendClient>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            presence: controller.presence(),
            controller,
            backend: None,
            devices: DevicesScreen::new(),
            pairing: None,
            pending_removal: None,
            error_dialog: None,
            send_prompt: None,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
            notification: None,
        }
    }

    /// Let the `b` key restart `backend`.
    #[must_use]
    pub fn with_backend(mut self, backend: Option<ManagedBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut session = TerminalSession::start()?;
        self.devices.init(self.action_tx.clone())?;

        let controller = self.controller.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        let mut events = EventReader::spawn();

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    session.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        drop(events);
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Modal layers capture input top-down;
    /// whatever is left goes to the global bindings, then the screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.error_dialog.is_some() {
            return Ok(match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Action::DismissError),
                _ => None,
            });
        }

        if let Some(prompt) = &self.send_prompt {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::CloseSendPrompt),
                KeyCode::Enter => Some(Action::SubmitSendPrompt),
                KeyCode::Backspace => {
                    let mut input = prompt.input.clone();
                    input.pop();
                    Some(Action::SendPromptInput(input))
                }
                KeyCode::Char(c) => {
                    let mut input = prompt.input.clone();
                    input.push(c);
                    Some(Action::SendPromptInput(input))
                }
                _ => None,
            });
        }

        if self.pending_removal.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::Dispatch(Intent::ConfirmRemoval)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    Some(Action::Dispatch(Intent::DeclineRemoval))
                }
                _ => None,
            });
        }

        if self.pairing.is_some() {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::Dispatch(Intent::ClosePairing)),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                return Ok(Some(Action::Dispatch(Intent::Refresh)));
            }
            (KeyModifiers::NONE, KeyCode::Char('b')) => return Ok(Some(Action::RestartBackend)),
            (KeyModifiers::NONE, KeyCode::Char('p')) => {
                // Disabled until the backend is connected.
                return Ok(self
                    .presence
                    .pairing_enabled()
                    .then_some(Action::Dispatch(Intent::Pair)));
            }
            _ => {}
        }

        self.devices.handle_key_event(key)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(..) | Action::Render => {}

            Action::Tick => {
                // Auto-dismiss notifications after 3 seconds
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > Duration::from_secs(3) {
                        self.notification = None;
                    }
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::PresenceUpdated(presence) => self.presence = presence.clone(),

            Action::DirectoryUpdated(_) => {
                if let Some(follow_up) = self.devices.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
            }

            Action::PairingUpdated(session) => self.pairing = session.clone(),

            Action::RemovalUpdated(pending) => self.pending_removal = pending.clone(),

            Action::Dispatch(intent) => self.execute(intent.clone()),

            Action::RestartBackend => self.restart_backend(),

            Action::OpenSendPrompt { device_id, name } => {
                self.send_prompt = Some(SendPrompt {
                    device_id: device_id.clone(),
                    name: name.clone(),
                    input: String::new(),
                });
            }

            Action::SendPromptInput(input) => {
                if let Some(prompt) = &mut self.send_prompt {
                    prompt.input.clone_from(input);
                }
            }

            Action::SubmitSendPrompt => {
                if let Some(prompt) = self.send_prompt.take() {
                    self.execute(Intent::SendFile {
                        device_id: prompt.device_id,
                        paths: parse_paths(&prompt.input),
                    });
                }
            }

            Action::CloseSendPrompt => self.send_prompt = None,

            Action::ShowError(message) => self.error_dialog = Some(message.clone()),

            Action::DismissError => self.error_dialog = None,

            Action::Notify(notification) => self.notify(notification.clone()),
        }
        Ok(())
    }

    /// Run an intent on the controller in the background and report back.
    fn execute(&self, intent: Intent) {
        debug!(?intent, "dispatching intent");
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        let removal_name = self
            .pending_removal
            .as_ref()
            .map(|p| p.display_name.clone());

        tokio::spawn(async move {
            let is_pair = matches!(intent, Intent::Pair);
            match controller.dispatch(intent).await {
                Ok(outcome) => {
                    if let Some(notification) = outcome_notification(&outcome, removal_name) {
                        let _ = tx.send(Action::Notify(notification));
                    }
                }
                Err(e) if is_pair => {
                    let _ = tx.send(Action::ShowError(pairing_failure_message(&e)));
                }
                Err(e) => {
                    warn!(error = %e, "intent failed");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    /// Restart the managed backend in the background, then refresh.
    /// A restart already in flight holds the lock, so a second request is
    /// refused rather than queued.
    fn restart_backend(&mut self) {
        let Some(backend) = &self.backend else {
            self.notify(Notification::info("Backend is not managed by bridgex"));
            return;
        };
        let Ok(mut process) = Arc::clone(backend).try_lock_owned() else {
            self.notify(Notification::info("Backend restart already in progress"));
            return;
        };
        self.notify(Notification::info("Restarting backend..."));

        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match process
                .restart(controller.gateway(), crate::BACKEND_STARTUP_TIMEOUT)
                .await
            {
                Ok(()) => {
                    drop(process);
                    let _ = tx.send(Action::Notify(Notification::success("Backend restarted")));
                    let _ = tx.send(Action::Dispatch(Intent::Refresh));
                }
                Err(e) => {
                    warn!(error = %e, "backend restart failed");
                    let _ = tx.send(Action::Notify(Notification::error(format!(
                        "Backend restart failed: {e}"
                    ))));
                }
            }
        });
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Directory
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.devices.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        // Overlays on top (order matters: last = topmost)
        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if let Some(ref session) = self.pairing {
            pairing_overlay::render(frame, area, session);
        }
        if let Some(ref pending) = self.pending_removal {
            dialog::render_confirm(
                frame,
                area,
                &format!(
                    "Remove {} ({})?",
                    pending.display_name,
                    id_label(&pending.device_id)
                ),
            );
        }
        if let Some(ref prompt) = self.send_prompt {
            dialog::render_prompt(
                frame,
                area,
                &format!("Send to {}", prompt.name),
                "File paths, comma separated:",
                &prompt.input,
            );
        }
        if let Some(ref message) = self.error_dialog {
            dialog::render_error(frame, area, message);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let pair_style = if self.presence.pairing_enabled() {
            (theme::key_hint_key(), theme::key_hint())
        } else {
            (theme::key_hint_disabled(), theme::key_hint_disabled())
        };

        let line = Line::from(vec![
            Span::raw(" "),
            status_indicator::presence_span(&self.presence),
            Span::styled(
                format!(" │ {} │ ", self.controller.config().device_name),
                theme::key_hint(),
            ),
            Span::styled("p ", pair_style.0),
            Span::styled("pair  ", pair_style.1),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_area = dialog::centered_rect(area, 50, 15);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("p", "Pair a new device"),
            entry("r", "Refresh status and devices"),
            entry("s", "Send files to selected device"),
            entry("b", "Restart the managed backend"),
            entry("d", "Remove selected device"),
            entry("Esc", "Close overlay"),
            entry("?", "Toggle this help"),
            entry("q", "Quit"),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a notification toast in the bottom-right corner.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        #[allow(clippy::cast_possible_truncation)]
        let msg_len = notif.message.chars().count().min(usize::from(u16::MAX)) as u16;
        let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(&notif.message, Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

/// Toast for a completed intent. Outcomes whose effect is already visible
/// through published state (overlay, confirmation) get none.
fn outcome_notification(outcome: &Outcome, removal_name: Option<String>) -> Option<Notification> {
    match outcome {
        Outcome::Refreshed {
            device_count: Some(count),
            ..
        } => Some(Notification::info(format!(
            "Refreshed: {count} paired device{}",
            if *count == 1 { "" } else { "s" }
        ))),
        Outcome::Refreshed {
            device_count: None, ..
        } => Some(Notification::error("Failed to load devices")),
        Outcome::DeviceRemoved { device_id } => Some(Notification::success(format!(
            "Removed {}",
            removal_name.unwrap_or_else(|| id_label(device_id))
        ))),
        Outcome::FileSent(handle) => Some(Notification::success(format!(
            "Sent {} file{} ({} bytes) to {}",
            handle.files.len(),
            if handle.files.len() == 1 { "" } else { "s" },
            handle.total_bytes(),
            id_label(&handle.device_id)
        ))),
        Outcome::PairingOpened(_)
        | Outcome::PairingClosed { .. }
        | Outcome::RemovalPending(_)
        | Outcome::RemovalDeclined(_) => None,
    }
}

fn pairing_failure_message(err: &CoreError) -> String {
    format!("Pairing failed: {}", err.detail())
}

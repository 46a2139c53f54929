//! Core application state and logic.
//!
//! This module contains the main [`App`] struct that owns the output buffer,
//! the interface monitor and UI state. Background work never touches `App`
//! directly: workers and the monitor deliver through a [`ChannelSink`] that
//! [`App::process_external`] drains on the presentation thread.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use crate::config::AppConfig;
use crate::constants;
use crate::core::{self, ChannelSink, Delivery, OutputTag, Poller, Sink, StartOutcome, StopOutcome};
use crate::logger;
use crate::message::{Message, ScrollMove};
use crate::utils;
use crate::vpn::{self, WgAction};

// Re-export state types for convenient access
pub use crate::state::{FocusedPanel, OutputBuffer, ScrollState, Toast, ToastType};

/// Main application state container.
pub struct App {
    /// Flag indicating the application should exit.
    pub should_quit: bool,
    pub config: AppConfig,

    // === Output ===
    pub output: OutputBuffer,
    pub output_scroll: ScrollState,
    /// Scroll position for the event log (entries live in the logger module)
    pub logs_scroll: ScrollState,

    // === UI State ===
    pub focused_panel: FocusedPanel,
    pub panel_areas: HashMap<FocusedPanel, Rect>,
    pub toast: Option<Toast>,
    pub is_root: bool,

    // === Background Work ===
    poller: Poller,
    sink: Arc<dyn Sink>,
    delivery_rx: mpsc::Receiver<Delivery>,
    /// One-shot `wg`/`wg-quick` invocations that may still be running.
    workers: Vec<JoinHandle<()>>,
}

impl App {
    /// Create a new App for the configured interface.
    pub fn new(config: AppConfig) -> Self {
        let (sink, delivery_rx) = ChannelSink::channel();

        logger::log(
            logger::LogLevel::Info,
            "APP",
            format!(
                "{} v{} managing interface {}",
                constants::APP_NAME,
                constants::APP_VERSION,
                config.interface
            ),
        );

        Self {
            should_quit: false,
            output: OutputBuffer::new(config.max_output_lines),
            output_scroll: ScrollState::default(),
            logs_scroll: ScrollState::default(),
            focused_panel: FocusedPanel::default(),
            panel_areas: HashMap::new(),
            toast: None,
            is_root: utils::is_root(),
            poller: Poller::new(config.command_timeout()),
            sink: Arc::new(sink),
            delivery_rx,
            workers: Vec::new(),
            config,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.poller.is_running()
    }

    /// Number of one-shot commands still running.
    pub fn pending_actions(&self) -> usize {
        self.workers.iter().filter(|h| !h.is_finished()).count()
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Global: Quit (Always takes priority)
        if (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
            || key.code == KeyCode::Char('q')
        {
            self.handle_message(Message::Quit);
            return;
        }

        // Dismiss toast on Esc
        if key.code == KeyCode::Esc {
            self.toast = None;
            return;
        }

        let msg = match key.code {
            KeyCode::Char('u') => Message::Up,
            KeyCode::Char('d') => Message::Down,
            KeyCode::Char('s') => Message::Show,
            KeyCode::Char('m') => Message::StartMonitor,
            KeyCode::Char('M') => Message::StopMonitor,
            KeyCode::Char('c') => Message::ClearOutput,
            KeyCode::Tab | KeyCode::BackTab => Message::NextPanel,
            KeyCode::Up | KeyCode::Char('k') => Message::Scroll(ScrollMove::Up),
            KeyCode::Down | KeyCode::Char('j') => Message::Scroll(ScrollMove::Down),
            KeyCode::PageUp => Message::Scroll(ScrollMove::PageUp),
            KeyCode::PageDown => Message::Scroll(ScrollMove::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Message::Scroll(ScrollMove::Top),
            KeyCode::End | KeyCode::Char('G') => Message::Scroll(ScrollMove::Bottom),
            _ => return,
        };
        self.handle_message(msg);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        use crossterm::event::{MouseButton, MouseEventKind};
        match mouse.kind {
            MouseEventKind::ScrollDown => self.handle_message(Message::Scroll(ScrollMove::Down)),
            MouseEventKind::ScrollUp => self.handle_message(Message::Scroll(ScrollMove::Up)),
            MouseEventKind::Down(MouseButton::Left) => {
                let clicked = self.panel_areas.iter().find(|(_, area)| {
                    mouse.column >= area.x
                        && mouse.column < area.x + area.width
                        && mouse.row >= area.y
                        && mouse.row < area.y + area.height
                });
                if let Some((panel, _)) = clicked {
                    self.focused_panel = *panel;
                }
            }
            _ => {}
        }
    }

    pub fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Up => self.run_action(WgAction::Up),
            Message::Down => self.run_action(WgAction::Down),
            Message::Show => self.run_action(WgAction::Show),

            Message::StartMonitor => self.start_monitor(),
            Message::StopMonitor => self.stop_monitor(),

            Message::NextPanel => self.focused_panel = self.focused_panel.next(),
            Message::Scroll(mv) => match self.focused_panel {
                FocusedPanel::Output => self.output_scroll.scroll(mv, self.output.len()),
                FocusedPanel::Logs => self.logs_scroll.scroll(mv, logger::get_logs().len()),
            },

            Message::ClearOutput => {
                self.output.clear();
                self.output_scroll.reset();
                crate::log_debug!("APP", "Output cleared");
            }
            Message::Delivery(delivery) => self.on_delivery(&delivery),
            Message::Tick => {
                if self.toast.as_ref().is_some_and(Toast::is_expired) {
                    self.toast = None;
                }
                self.reap_workers();
            }
            Message::Resize(width, height) => {
                // ratatui re-lays out on the next draw
                crate::log_debug!("APP", "Terminal resized to {width}x{height}");
            }
            Message::Quit => self.should_quit = true,
        }
    }

    /// Spawns a worker for a one-shot `wg`/`wg-quick` command.
    fn run_action(&mut self, action: WgAction) {
        let interface = self.config.interface.clone();
        self.append(&Delivery::notice(action.notice(&interface)));

        let spec = action.spec(&interface);
        let timeout = self.config.command_timeout();
        let sink = Arc::clone(&self.sink);

        crate::log_info!("APP", "{} requested for {interface}", action.tag().label());
        let handle = thread::spawn(move || {
            let result = core::execute(&spec, timeout);
            sink.deliver(Delivery::result(action.tag(), result));
        });
        self.workers.push(handle);
    }

    fn start_monitor(&mut self) {
        let interface = self.config.interface.clone();
        match self.poller.start(
            self.config.poll_interval(),
            vpn::monitor_spec(&interface),
            Arc::clone(&self.sink),
        ) {
            StartOutcome::Started => {
                self.append(&Delivery::notice(format!(
                    "{}{interface}...",
                    constants::MSG_MONITOR_STARTED
                )));
            }
            StartOutcome::AlreadyRunning => {
                self.show_toast(
                    constants::MSG_MONITOR_ALREADY_RUNNING.to_string(),
                    ToastType::Info,
                );
            }
        }
    }

    fn stop_monitor(&mut self) {
        let outcome = self.poller.stop();
        // Updates queued before the stop belong above the stop notice.
        self.process_external();
        let text = match outcome {
            StopOutcome::Stopped => constants::MSG_MONITOR_STOPPED,
            StopOutcome::NotRunning => constants::MSG_MONITOR_NOT_RUNNING,
        };
        self.append(&Delivery::notice(text));
    }

    fn on_delivery(&mut self, delivery: &Delivery) {
        crate::log_debug!("APP", "Received {} output", delivery.tag.label());
        self.append(delivery);

        if delivery.is_failure() {
            let (message, toast_type) = match delivery.tag {
                // The monitor keeps going; flag it without alarming.
                OutputTag::Update => ("Monitor update failed".to_string(), ToastType::Warning),
                tag => (format!("'{}' failed", tag.label()), ToastType::Error),
            };
            self.show_toast(message, toast_type);
        } else if matches!(delivery.tag, OutputTag::Up | OutputTag::Down) {
            self.show_toast(
                format!("Interface {} {}", self.config.interface, delivery.tag.label()),
                ToastType::Success,
            );
        }
    }

    fn append(&mut self, delivery: &Delivery) {
        let evicted = self.output.push(delivery);
        self.output_scroll.on_evicted(evicted);
    }

    /// Show a toast notification and log it
    fn show_toast(&mut self, message: String, toast_type: ToastType) {
        let level = match toast_type {
            ToastType::Error => logger::LogLevel::Error,
            ToastType::Warning => logger::LogLevel::Warning,
            ToastType::Info | ToastType::Success => logger::LogLevel::Info,
        };
        logger::log(level, "APP", message.as_str());
        self.toast = Some(Toast::new(message, toast_type));
    }

    fn reap_workers(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) =
            self.workers.drain(..).partition(JoinHandle::is_finished);
        self.workers = pending;
        for handle in finished {
            if handle.join().is_err() {
                crate::log_error!("APP", "Command worker panicked");
            }
        }
    }

    /// Periodic tick from the event loop.
    pub fn on_tick(&mut self) {
        self.handle_message(Message::Tick);
    }

    /// Handle terminal resize.
    /// In TEA, this dispatches a Resize message.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.handle_message(Message::Resize(width, height));
    }

    /// Process all pending deliveries from workers and the monitor.
    /// Called by main loop before every draw so output appears immediately.
    pub fn process_external(&mut self) {
        while let Ok(delivery) = self.delivery_rx.try_recv() {
            self.handle_message(Message::Delivery(delivery));
        }
    }

    /// Stops the monitor and waits for every running command.
    pub fn shutdown(&mut self) {
        if self.pending_actions() > 0 || self.poller.commands_in_flight() > 0 {
            eprintln!("{}", constants::MSG_WAITING_FOR_WORKERS);
        }
        self.poller.shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

//! Delivery of command output to the presentation surface.
//!
//! Workers never touch the display directly. They hand a [`Delivery`] to a
//! [`Sink`], which either queues it for the TUI thread ([`ChannelSink`]) or
//! writes it out in one piece ([`WriterSink`]).

use std::io::Write;
use std::sync::{mpsc, Mutex, PoisonError};
use std::time::SystemTime;

use super::runner::{CommandFailure, CommandResult};
use crate::constants;

/// Which action produced a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTag {
    /// `wg-quick up`
    Up,
    /// `wg-quick down`
    Down,
    /// One-shot `wg show`
    Show,
    /// Periodic `wg show` from the monitor
    Update,
    /// Status text from the application itself
    Notice,
}

impl OutputTag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Show => "show",
            Self::Update => "update",
            Self::Notice => "notice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryBody {
    Result(CommandResult),
    Notice(String),
}

/// One chunk of text bound for the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub timestamp: SystemTime,
    pub tag: OutputTag,
    pub body: DeliveryBody,
}

impl Delivery {
    pub fn result(tag: OutputTag, result: CommandResult) -> Self {
        Self {
            timestamp: SystemTime::now(),
            tag,
            body: DeliveryBody::Result(result),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            tag: OutputTag::Notice,
            body: DeliveryBody::Notice(text.into()),
        }
    }

    /// Whether this delivery reports a failed command.
    pub fn is_failure(&self) -> bool {
        matches!(&self.body, DeliveryBody::Result(CommandResult::Failure(_)))
    }

    /// Text appended to the display for this delivery, always ending in a newline.
    pub fn render(&self) -> String {
        let body = match &self.body {
            DeliveryBody::Result(result) => render_result(result),
            DeliveryBody::Notice(text) => ensure_newline(text.clone()),
        };

        match self.tag {
            OutputTag::Update => format!(
                "[{}] {}\n{}\n",
                crate::utils::format_system_time_local(self.timestamp),
                constants::MSG_UPDATE_HEADER,
                body
            ),
            OutputTag::Notice => body,
            OutputTag::Up | OutputTag::Down | OutputTag::Show => format!("{body}\n"),
        }
    }
}

fn render_result(result: &CommandResult) -> String {
    match result {
        CommandResult::Success(stdout) => ensure_newline(stdout.clone()),
        CommandResult::Failure(CommandFailure::NonZeroExit { stderr, .. }) => {
            ensure_newline(format!("{}\n{stderr}", constants::MSG_ERROR_HEADER))
        }
        CommandResult::Failure(CommandFailure::Timeout { after }) => {
            format!("{}{}s.\n", constants::MSG_TIMEOUT, after.as_secs_f32())
        }
        CommandResult::Failure(CommandFailure::Launch { program, reason }) => {
            format!("{}{program}: {reason}\n", constants::MSG_LAUNCH_FAILED)
        }
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Destination for deliveries, callable from any thread.
pub trait Sink: Send + Sync {
    fn deliver(&self, delivery: Delivery);
}

/// Queues deliveries for the thread owning the matching receiver.
///
/// The TUI drains the receiver once per event-loop iteration, so every
/// append happens on the presentation thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Delivery>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Delivery>) -> Self {
        Self { tx }
    }

    /// Creates a sink together with the receiver that drains it.
    pub fn channel() -> (Self, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl Sink for ChannelSink {
    fn deliver(&self, delivery: Delivery) {
        if self.tx.send(delivery).is_err() {
            crate::log_debug!("SINK", "Display closed, dropping delivery");
        }
    }
}

/// Writes each rendered delivery in one piece under a lock, so output from
/// different threads never interleaves.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: Mutex<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn deliver(&self, delivery: Delivery) {
        let text = delivery.render();
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// Headless output.
pub type StdoutSink = WriterSink<std::io::Stdout>;

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new(std::io::stdout())
    }
}

/// Sink that keeps every delivery, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: std::sync::Mutex<Vec<Delivery>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn count(&self) -> usize {
        self.deliveries.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Sink for RecordingSink {
    fn deliver(&self, delivery: Delivery) {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push(delivery);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_render_success_for_manual_action() {
        let delivery = Delivery::result(
            OutputTag::Show,
            CommandResult::Success("interface: wg0\n".to_string()),
        );
        assert_eq!(delivery.render(), "interface: wg0\n\n");
        assert!(!delivery.is_failure());
    }

    #[test]
    fn test_render_nonzero_exit() {
        let delivery = Delivery::result(
            OutputTag::Up,
            CommandResult::Failure(CommandFailure::NonZeroExit {
                code: Some(1),
                stderr: "wg-quick: `wg0' already exists\n".to_string(),
            }),
        );
        assert_eq!(delivery.render(), "Error:\nwg-quick: `wg0' already exists\n\n");
        assert!(delivery.is_failure());
    }

    #[test]
    fn test_render_timeout_and_launch() {
        let timeout = Delivery::result(
            OutputTag::Down,
            CommandResult::Failure(CommandFailure::Timeout {
                after: Duration::from_secs(10),
            }),
        );
        assert_eq!(timeout.render(), "Error: command timed out after 10s.\n\n");

        let launch = Delivery::result(
            OutputTag::Show,
            CommandResult::Failure(CommandFailure::Launch {
                program: "wg".to_string(),
                reason: "No such file or directory (os error 2)".to_string(),
            }),
        );
        assert!(launch
            .render()
            .starts_with("Exception: failed to launch wg: No such file"));
    }

    #[test]
    fn test_render_update_has_timestamp_and_label() {
        let delivery = Delivery::result(
            OutputTag::Update,
            CommandResult::Success("peer: abc\n".to_string()),
        );
        let text = delivery.render();
        assert!(text.starts_with('['));
        assert!(text.contains("] Update:\npeer: abc\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_render_notice_gets_newline() {
        assert_eq!(Delivery::notice("Monitoring stopped.").render(), "Monitoring stopped.\n");
    }

    #[test]
    fn test_channel_sink_across_threads() {
        let (sink, rx) = ChannelSink::channel();
        let sink = Arc::new(sink);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || sink.deliver(Delivery::notice(format!("worker {i}"))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received.len(), 4);
        assert!(received.iter().all(|d| d.tag == OutputTag::Notice));
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);
        sink.deliver(Delivery::notice("nobody listening"));
    }

    #[test]
    fn test_writer_sink_keeps_deliveries_whole_across_threads() {
        let sink = Arc::new(WriterSink::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        sink.deliver(Delivery::result(
                            OutputTag::Show,
                            CommandResult::Success(format!("worker {i} a\nworker {i} b\n")),
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::into_inner(sink).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let blocks: Vec<&str> = text.split_terminator("\n\n").collect();
        assert_eq!(blocks.len(), 400);
        for block in blocks {
            let lines: Vec<&str> = block.lines().collect();
            assert_eq!(lines.len(), 2, "interleaved block: {block:?}");
            let worker = lines[0].trim_end_matches(" a");
            assert_eq!(lines[1], format!("{worker} b"));
        }
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(OutputTag::Update.label(), "update");
        assert_eq!(OutputTag::Up.label(), "up");
    }
}

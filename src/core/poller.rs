//! Periodic command polling on a background thread.
//!
//! A [`Poller`] owns at most one active loop. Each iteration runs the command
//! through [`runner::execute`], hands the result to a [`Sink`] tagged as an
//! update, then sleeps. Stopping is cooperative: the loop notices at its next
//! check, the sleep is cut short, and an invocation already running is left
//! to finish but its result is dropped.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::runner::{self, CommandSpec};
use super::sink::{Delivery, OutputTag, Sink};
use crate::constants;

/// Whether a poller currently has an active loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerState {
    #[default]
    Idle,
    Running,
}

/// Result of [`Poller::start`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A loop was already active; nothing was spawned.
    AlreadyRunning,
}

/// Result of [`Poller::stop`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// There was no active loop.
    NotRunning,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Cooperative cancellation flag shared between a poller and its loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and wakes any [`CancelToken::sleep`].
    ///
    /// Returns only once no [`CancelToken::unless_cancelled`] section is running.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let _guard = self.guard();
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` or until cancelled. Returns `true` if cancelled.
    ///
    /// A duration too large to represent as a deadline sleeps until cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut guard = self.guard();
        loop {
            if self.is_cancelled() {
                return true;
            }
            guard = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    match self.inner.wake.wait_timeout(guard, deadline - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .inner
                    .wake
                    .wait(guard)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Runs `f` if the token is not cancelled. `cancel()` waits for `f` to return.
    pub fn unless_cancelled(&self, f: impl FnOnce()) -> bool {
        let _guard = self.guard();
        if self.is_cancelled() {
            return false;
        }
        f();
        true
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

struct ActiveLoop {
    token: CancelToken,
    handle: JoinHandle<()>,
}

/// Repeatedly runs one command and delivers each result, until stopped.
pub struct Poller {
    command_timeout: Duration,
    active: Option<ActiveLoop>,
    /// Stopped loops that may still be finishing an invocation.
    retired: Vec<JoinHandle<()>>,
    /// Invocations currently running across all of this poller's loops.
    in_flight: Arc<AtomicUsize>,
}

impl Poller {
    /// Creates an idle poller whose invocations are bounded by `command_timeout`.
    pub fn new(command_timeout: Duration) -> Self {
        Self {
            command_timeout,
            active: None,
            retired: Vec::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of commands started by this poller that have not returned yet.
    pub fn commands_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// A loop whose thread has ended (it panicked) counts as idle.
    pub fn state(&self) -> PollerState {
        match &self.active {
            Some(active) if !active.handle.is_finished() => PollerState::Running,
            _ => PollerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollerState::Running
    }

    /// Starts polling `spec` every `interval`, delivering to `sink`.
    ///
    /// Intervals shorter than a few milliseconds are raised to a floor so the
    /// loop cannot spin.
    pub fn start(
        &mut self,
        interval: Duration,
        spec: CommandSpec,
        sink: Arc<dyn Sink>,
    ) -> StartOutcome {
        if self.is_running() {
            crate::log_debug!("POLL", "Start ignored: already running");
            return StartOutcome::AlreadyRunning;
        }
        self.retire_dead_loop();
        self.reap_finished();

        let interval = interval.max(Duration::from_millis(constants::MIN_POLL_INTERVAL_MS));
        let token = CancelToken::new();
        let loop_token = token.clone();
        let timeout = self.command_timeout;
        let in_flight = Arc::clone(&self.in_flight);

        crate::log_info!(
            "POLL",
            "Monitoring '{spec}' every {}s",
            interval.as_secs_f32()
        );
        let handle = thread::spawn(move || {
            poll_loop(&spec, interval, timeout, &loop_token, &*sink, &in_flight);
        });

        self.active = Some(ActiveLoop { token, handle });
        StartOutcome::Started
    }

    /// Stops the active loop, if any. Never blocks on an in-flight command.
    pub fn stop(&mut self) -> StopOutcome {
        self.retire_dead_loop();
        let Some(active) = self.active.take() else {
            return StopOutcome::NotRunning;
        };
        active.token.cancel();
        self.retired.push(active.handle);
        self.reap_finished();
        crate::log_info!("POLL", "Monitoring stopped");
        StopOutcome::Stopped
    }

    /// Stops polling and waits for every loop this poller started to exit.
    pub fn shutdown(&mut self) {
        let _ = self.stop();
        for handle in self.retired.drain(..) {
            if handle.join().is_err() {
                crate::log_error!("POLL", "Monitor thread panicked");
            }
        }
    }

    /// Moves a loop whose thread already ended out of `active`.
    fn retire_dead_loop(&mut self) {
        if self.active.as_ref().is_some_and(|a| a.handle.is_finished()) {
            if let Some(dead) = self.active.take() {
                crate::log_error!("POLL", "Monitor loop ended unexpectedly");
                self.retired.push(dead.handle);
            }
        }
    }

    fn reap_finished(&mut self) {
        let (finished, pending): (Vec<_>, Vec<_>) = self
            .retired
            .drain(..)
            .partition(JoinHandle::is_finished);
        self.retired = pending;
        for handle in finished {
            let _ = handle.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_loop(
    spec: &CommandSpec,
    interval: Duration,
    timeout: Duration,
    token: &CancelToken,
    sink: &dyn Sink,
    in_flight: &AtomicUsize,
) {
    while !token.is_cancelled() {
        in_flight.fetch_add(1, Ordering::SeqCst);
        let result = runner::execute(spec, timeout);
        in_flight.fetch_sub(1, Ordering::SeqCst);

        let delivered =
            token.unless_cancelled(|| sink.deliver(Delivery::result(OutputTag::Update, result)));
        if !delivered {
            crate::log_debug!("POLL", "Discarded result of '{spec}' finished after stop");
            break;
        }

        if token.sleep(interval) {
            break;
        }
    }
    crate::log_debug!("POLL", "Monitor loop for '{spec}' exited");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::sink::RecordingSink;

    fn echo() -> CommandSpec {
        CommandSpec::new("echo", ["tick"])
    }

    fn wait_for(sink: &RecordingSink, at_least: usize, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            if sink.count() >= at_least {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_start_then_start_again_reports_already_running() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));
        let interval = Duration::from_millis(50);

        assert_eq!(poller.start(interval, echo(), sink.clone()), StartOutcome::Started);
        assert_eq!(
            poller.start(interval, echo(), sink.clone()),
            StartOutcome::AlreadyRunning
        );
        assert!(poller.is_running());

        thread::sleep(Duration::from_millis(500));
        poller.shutdown();

        // A single loop delivers at most once per interval, plus the first run.
        let count = sink.count();
        assert!(count >= 1, "no deliveries");
        assert!(count <= 11, "{count} deliveries suggests a second loop");
    }

    #[test]
    fn test_no_deliveries_after_stop() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));
        let interval = Duration::from_millis(30);

        assert_eq!(poller.start(interval, echo(), sink.clone()), StartOutcome::Started);
        assert!(wait_for(&sink, 2, Duration::from_secs(5)));

        assert_eq!(poller.stop(), StopOutcome::Stopped);
        let after_stop = sink.count();
        thread::sleep(interval * 5);
        assert_eq!(sink.count(), after_stop);
        assert!(!poller.is_running());
    }

    #[test]
    fn test_stop_when_idle_is_not_running() {
        let mut poller = Poller::new(Duration::from_secs(5));
        assert_eq!(poller.state(), PollerState::Idle);
        assert_eq!(poller.stop(), StopOutcome::NotRunning);

        let sink = Arc::new(RecordingSink::default());
        let _ = poller.start(Duration::from_secs(1), echo(), sink);
        assert_eq!(poller.stop(), StopOutcome::Stopped);
        assert_eq!(poller.stop(), StopOutcome::NotRunning);
    }

    #[test]
    fn test_restart_after_stop() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));

        let _ = poller.start(Duration::from_millis(20), echo(), sink.clone());
        assert_eq!(poller.stop(), StopOutcome::Stopped);
        assert_eq!(
            poller.start(Duration::from_millis(20), echo(), sink.clone()),
            StartOutcome::Started
        );
        assert!(wait_for(&sink, 1, Duration::from_secs(5)));
        poller.shutdown();
    }

    #[test]
    fn test_stop_interrupts_sleep() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));

        let _ = poller.start(Duration::from_secs(30), echo(), sink.clone());
        assert!(wait_for(&sink, 1, Duration::from_secs(5)));

        let started = Instant::now();
        poller.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_deliveries_are_tagged_updates() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));

        let _ = poller.start(Duration::from_millis(20), echo(), sink.clone());
        assert!(wait_for(&sink, 1, Duration::from_secs(5)));
        poller.shutdown();

        let first = &sink.snapshot()[0];
        assert_eq!(first.tag, OutputTag::Update);
        assert!(first.render().contains("Update:\ntick\n"));
    }

    #[test]
    fn test_in_flight_result_discarded_after_stop() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));
        let slow = CommandSpec::new("sleep", ["0.3"]);

        let _ = poller.start(Duration::from_millis(20), slow, sink.clone());
        thread::sleep(Duration::from_millis(50));
        assert_eq!(poller.stop(), StopOutcome::Stopped);
        poller.shutdown();

        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_commands_in_flight_counts_running_invocation() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));
        assert_eq!(poller.commands_in_flight(), 0);

        let _ = poller.start(Duration::from_secs(30), CommandSpec::new("sleep", ["0.5"]), sink.clone());
        thread::sleep(Duration::from_millis(100));
        assert_eq!(poller.commands_in_flight(), 1);

        poller.shutdown();
        assert_eq!(poller.commands_in_flight(), 0);
    }

    /// Panics on the first delivery, killing the loop thread.
    struct PanickingSink;

    impl Sink for PanickingSink {
        fn deliver(&self, _delivery: Delivery) {
            panic!("sink failure");
        }
    }

    #[test]
    fn test_dead_loop_reports_idle_and_can_restart() {
        let mut poller = Poller::new(Duration::from_secs(5));
        let _ = poller.start(Duration::from_millis(20), echo(), Arc::new(PanickingSink));

        let deadline = Instant::now() + Duration::from_secs(5);
        while poller.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(poller.state(), PollerState::Idle);

        let sink = Arc::new(RecordingSink::default());
        assert_eq!(
            poller.start(Duration::from_millis(20), echo(), sink.clone()),
            StartOutcome::Started
        );
        assert!(wait_for(&sink, 1, Duration::from_secs(5)));
        poller.shutdown();
    }

    #[test]
    fn test_huge_interval_sleeps_until_stopped() {
        let sink = Arc::new(RecordingSink::default());
        let mut poller = Poller::new(Duration::from_secs(5));

        let _ = poller.start(Duration::MAX, echo(), sink.clone());
        assert!(wait_for(&sink, 1, Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(50));
        assert!(poller.is_running());

        let started = Instant::now();
        assert_eq!(poller.stop(), StopOutcome::Stopped);
        poller.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_cancel_token_sleep() {
        let token = CancelToken::new();
        assert!(!token.sleep(Duration::from_millis(20)));

        let waker = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            waker.cancel();
        });

        let started = Instant::now();
        assert!(token.sleep(Duration::from_secs(30)));
        assert!(started.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();

        assert!(!token.unless_cancelled(|| panic!("must not run after cancel")));
    }
}

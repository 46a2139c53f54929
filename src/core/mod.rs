//! Core building blocks for running and monitoring `WireGuard` commands.
//!
//! - `runner`: blocking command execution with a timeout
//! - `availability`: required-program lookup on `PATH`
//! - `poller`: cancellable background loop that repeats a command
//! - `sink`: thread-safe delivery of output to the display

pub mod availability;
pub mod poller;
pub mod runner;
pub mod sink;

pub use poller::{Poller, StartOutcome, StopOutcome};
pub use runner::{execute, CommandFailure, CommandResult, CommandSpec};
pub use sink::{ChannelSink, Delivery, OutputTag, Sink, StdoutSink};

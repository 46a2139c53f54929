//! Bounded text buffer behind the output panel.

use std::collections::VecDeque;

use crate::core::{Delivery, OutputTag};

/// One displayed line, remembering where it came from for styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub tag: OutputTag,
    pub is_error: bool,
}

/// Keeps the most recent `max_lines` lines of delivered output.
///
/// Deliveries are appended whole; a delivery's lines are never split by
/// another delivery.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    lines: VecDeque<OutputLine>,
    max_lines: usize,
}

impl OutputBuffer {
    pub fn new(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            lines: VecDeque::with_capacity(max_lines.min(1024)),
            max_lines,
        }
    }

    /// Appends every line of the rendered delivery, evicting the oldest lines
    /// past capacity. Returns how many lines were evicted.
    pub fn push(&mut self, delivery: &Delivery) -> usize {
        let is_error = delivery.is_failure();
        for line in delivery.render().lines() {
            self.lines.push_back(OutputLine {
                text: line.to_string(),
                tag: delivery.tag,
                is_error,
            });
        }
        let evicted = self.lines.len().saturating_sub(self.max_lines);
        self.lines.drain(..evicted);
        evicted
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines `start..end`, clamped to what is stored.
    pub fn window(&self, start: usize, end: usize) -> impl Iterator<Item = &OutputLine> {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines.range(start..end)
    }
}

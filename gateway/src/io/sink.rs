//! Caller-facing progress sinks.
//!
//! The streamer calls a sink in the order lines appear on the child's stdout.
//! Sink failures never affect the build result, so the methods are infallible.

use std::io::{Stderr, Write};

use tracing::{info, warn};

/// Receives live progress while a build runs.
pub trait ProgressSink {
    /// Progress out of 100.
    fn report(&mut self, percent: u8);
    /// One informational stdout line.
    fn log(&mut self, line: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _percent: u8) {}

    fn log(&mut self, _line: &str) {}
}

/// Emits progress as tracing events (target `gateway::progress`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&mut self, percent: u8) {
        info!(target: "gateway::progress", percent, total = 100, "progress");
    }

    fn log(&mut self, line: &str) {
        info!(target: "gateway::progress", line, "output");
    }
}

/// Echoes output lines and progress changes to a terminal stream.
pub struct ConsoleSink<W: Write> {
    writer: W,
    last_percent: Option<u8>,
}

impl ConsoleSink<Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_percent: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush()) {
            warn!(err = %e, "failed to write progress output");
        }
    }
}

impl<W: Write> ProgressSink for ConsoleSink<W> {
    fn report(&mut self, percent: u8) {
        if self.last_percent == Some(percent) {
            return;
        }
        self.last_percent = Some(percent);
        self.write_line(&format!("[progress {percent:>3}%]"));
    }

    fn log(&mut self, line: &str) {
        self.write_line(line);
    }
}

//! Tracer: the user-facing reporting boundary.
//!
//! Every pipeline component reports progress, warnings and failures through a
//! [`Tracer`] instead of writing to stdout/stderr directly. Implementors only
//! provide the two primitive sinks; the semantic helpers are provided methods
//! built on top of them.
//!
//! Three implementations ship with the crate:
//! - [`ConsoleTracer`] writes to the process standard streams (the default)
//! - [`MemoryTracer`] captures lines in memory, for tests and embedding
//! - [`LogTracer`] forwards everything to `tracing` events

use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Structured reporting sink shared by the transformer and runner.
pub trait Tracer: Send + Sync {
    /// Write one line to the regular output channel.
    fn write_line(&self, line: &str);

    /// Write one line to the error channel.
    fn write_error_line(&self, line: &str);

    /// Report an informational message.
    fn inform(&self, message: &str) {
        self.write_line(message);
    }

    /// Report a non-fatal problem.
    fn warn(&self, message: &str) {
        self.write_error_line(&format!("warning: {message}"));
    }

    /// Report a failure.
    fn error(&self, message: &str) {
        self.write_error_line(&format!("error: {message}"));
    }

    /// Report the outcome of transforming one file.
    fn trace_file_transformation(&self, input: &Path, output: &Path, changed: bool) {
        let status = if changed { "changed" } else { "unchanged" };
        if input == output {
            self.write_line(&format!("{} ({status})", input.display()));
        } else {
            self.write_line(&format!(
                "{} -> {} ({status})",
                input.display(),
                output.display()
            ));
        }
    }

    /// Report that a codemod was loaded and is about to run.
    fn trace_codemod_loaded(&self, codemod: &str, path: &Path) {
        self.write_line(&format!("loaded codemod `{codemod}` from {}", path.display()));
    }

    /// Report an error. With `with_stack`, every link of the cause chain is
    /// printed as well.
    fn trace_exception(&self, err: &(dyn Error + 'static), with_stack: bool) {
        self.error(&err.to_string());
        if !with_stack {
            return;
        }
        let mut cause = err.source();
        while let Some(inner) = cause {
            self.write_error_line(&format!("  caused by: {inner}"));
            cause = inner.source();
        }
    }
}

// ============================================================================
// ConsoleTracer
// ============================================================================

/// Writes regular lines to stdout and error lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTracer;

impl ConsoleTracer {
    pub fn new() -> Self {
        Self
    }
}

impl Tracer for ConsoleTracer {
    fn write_line(&self, line: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }

    fn write_error_line(&self, line: &str) {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{line}");
    }
}

// ============================================================================
// MemoryTracer
// ============================================================================

/// Which channel a captured line was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Out,
    Err,
}

/// Captures every line in memory, in write order.
#[derive(Debug, Default)]
pub struct MemoryTracer {
    lines: Mutex<Vec<(Channel, String)>>,
}

impl MemoryTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines with their channel.
    pub fn entries(&self) -> Vec<(Channel, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Lines written to the regular channel.
    pub fn lines(&self) -> Vec<String> {
        self.channel(Channel::Out)
    }

    /// Lines written to the error channel.
    pub fn error_lines(&self) -> Vec<String> {
        self.channel(Channel::Err)
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    fn channel(&self, channel: Channel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line)
            .collect()
    }

    fn push(&self, channel: Channel, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((channel, line.to_string()));
        }
    }
}

impl Tracer for MemoryTracer {
    fn write_line(&self, line: &str) {
        self.push(Channel::Out, line);
    }

    fn write_error_line(&self, line: &str) {
        self.push(Channel::Err, line);
    }
}

// ============================================================================
// LogTracer
// ============================================================================

/// Forwards tracer output to `tracing` events.
///
/// Regular lines become `info` events, error lines `error` events, and
/// warnings keep their own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn write_line(&self, line: &str) {
        tracing::info!("{line}");
    }

    fn write_error_line(&self, line: &str) {
        tracing::error!("{line}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn trace_file_transformation(&self, input: &Path, output: &Path, changed: bool) {
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            changed,
            "transformed file"
        );
    }

    fn trace_codemod_loaded(&self, codemod: &str, path: &Path) {
        tracing::info!(codemod, path = %path.display(), "loaded codemod");
    }
}

// ============================================================================
// Tests
// ============================================================================

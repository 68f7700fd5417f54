//! Progress reporting for extraction runs.
//!
//! The engine emits [`ProgressEvent`]s into a [`ProgressSink`]. Two sinks
//! carry the same lines: [`BufferedProgress`] keeps them for the final
//! response, [`StreamedProgress`] pushes each one to a channel as it happens
//! and closes with [`ProgressMessage::End`].

use std::fmt;

use tokio::sync::mpsc;

/// One step of a run. Each entity yields a `Started` followed by exactly one
/// of the terminal variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { entity: String },
    Succeeded { entity: String, rows: usize },
    NoRows { entity: String },
    Failed { entity: String, reason: String },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started { .. })
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { entity } => write!(f, "Processing {}...", entity),
            Self::Succeeded { entity, rows } => write!(f, "{} done: {} rows", entity, rows),
            Self::NoRows { entity } => write!(f, "{}: no valid rows found", entity),
            Self::Failed { entity, reason } => write!(f, "{} failed: {}", entity, reason),
        }
    }
}

pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);

    /// Mark the end of the run. Calling it more than once has no further
    /// effect.
    fn finish(&mut self) {}
}

/// Collects progress lines in order for a one-shot response.
#[derive(Debug, Default)]
pub struct BufferedProgress {
    lines: Vec<String>,
}

impl BufferedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl ProgressSink for BufferedProgress {
    fn emit(&mut self, event: ProgressEvent) {
        self.lines.push(event.to_string());
    }
}

/// Item delivered to a streaming consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressMessage {
    Line(String),
    End,
}

/// Pushes each progress line into an unbounded channel as soon as it is
/// emitted.
#[derive(Debug)]
pub struct StreamedProgress {
    tx: mpsc::UnboundedSender<ProgressMessage>,
    finished: bool,
}

impl StreamedProgress {
    pub fn new(tx: mpsc::UnboundedSender<ProgressMessage>) -> Self {
        Self { tx, finished: false }
    }

    /// A sink plus the receiving half for the consumer.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, message: ProgressMessage) {
        if self.tx.send(message).is_err() {
            tracing::debug!("progress receiver dropped; line discarded");
        }
    }
}

impl ProgressSink for StreamedProgress {
    fn emit(&mut self, event: ProgressEvent) {
        if self.finished {
            tracing::warn!("progress event after end of stream: {}", event);
            return;
        }
        self.send(ProgressMessage::Line(event.to_string()));
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.send(ProgressMessage::End);
        }
    }
}

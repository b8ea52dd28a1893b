// Destinations of the finished report lines
use crate::error::SinkError;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Business transaction lines.
    Report,
    /// Room parser statistics lines.
    StatsReport,
    /// Copy of every line, for troubleshooting.
    Debug,
}

pub trait LogSink: Send + Sync {
    fn write(&self, kind: SinkKind, line: &str) -> Result<(), SinkError>;
}

// Forwards every line to `tracing`, one target per kind
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, kind: SinkKind, line: &str) -> Result<(), SinkError> {
        match kind {
            SinkKind::Report => tracing::info!(target: "uc_log_report::report", "{}", line),
            SinkKind::StatsReport => tracing::info!(target: "uc_log_report::stats", "{}", line),
            SinkKind::Debug => tracing::debug!(target: "uc_log_report::debug", "{}", line),
        }
        Ok(())
    }
}

// Keeps lines in memory, mostly for tests and replay tooling
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(SinkKind, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self, kind: SinkKind) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, kind: SinkKind, line: &str) -> Result<(), SinkError> {
        self.lines.lock().push((kind, line.to_string()));
        Ok(())
    }
}

/// Fire-and-forget delivery: `write` only enqueues, a background task drains the
/// queue into the wrapped sink.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<(SinkKind, String)>,
}

impl ChannelSink {
    /// Must be called from within a tokio runtime. The writer task ends once every
    /// clone of the returned sink has been dropped and the queue is drained.
    pub fn spawn(inner: Arc<dyn LogSink>) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<(SinkKind, String)>();

        let handle = tokio::spawn(async move {
            while let Some((kind, line)) = receiver.recv().await {
                if let Err(e) = inner.write(kind, &line) {
                    tracing::debug!("Dropping report line for {:?}: {}", kind, e);
                }
            }
        });

        (Self { sender }, handle)
    }
}

impl LogSink for ChannelSink {
    fn write(&self, kind: SinkKind, line: &str) -> Result<(), SinkError> {
        self.sender
            .send((kind, line.to_string()))
            .map_err(|e| SinkError::Closed(e.to_string()))
    }
}

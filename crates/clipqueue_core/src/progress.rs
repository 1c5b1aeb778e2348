use std::sync::mpsc;

/// Receives human-readable status lines and a 0-100 completion percentage.
///
/// Callbacks run synchronously on the thread driving the operation and must
/// return quickly.
pub trait ProgressSink {
    fn status(&self, message: &str);
    fn percent(&self, value: f64);
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn status(&self, _message: &str) {}
    fn percent(&self, _value: f64) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Status(String),
    Percent(f64),
}

/// Forwards reports over a channel so another thread (e.g. a UI) can render them.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn status(&self, message: &str) {
        let _ = self.tx.send(ProgressEvent::Status(message.to_string()));
    }

    fn percent(&self, value: f64) {
        let _ = self.tx.send(ProgressEvent::Percent(value));
    }
}

//! Metrics event boundary.
//!
//! The controller reports gameplay events through an [`EventSink`] and
//! never waits on it. Aggregation and persistence live outside the core.

use freezetag_types::EpisodeEvent;

/// Fire-and-forget receiver of episode events.
pub trait EventSink: Send {
    /// Handle one event.
    fn emit(&mut self, event: &EpisodeEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&mut self, _event: &EpisodeEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<EpisodeEvent>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Every event recorded so far.
    pub fn events(&self) -> &[EpisodeEvent] {
        &self.events
    }

    /// How many recorded events have the given [`EpisodeEvent::name`].
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &EpisodeEvent) {
        self.events.push(event.clone());
    }
}
